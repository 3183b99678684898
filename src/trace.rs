use piet::RenderContext;

/// A drawing that represents some data. Used inside the plot.
pub trait Trace {
    /// Draw the trace in plot space.
    ///
    /// The plotting box starts at `(0, 0)` and finishes at `(width, -height)`.
    fn draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error>;
}
