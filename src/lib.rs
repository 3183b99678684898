//! Interactive 2D plots drawn with piet.
//!
//! A [`Plot`] holds [`Layer`]s of data points, maps them into its plotting box on linear or
//! logarithmic scales, works out nice axis ticks, clips lines and shapes to the box, and handles
//! pan, zoom and point labeling from host input events.

mod clip;
mod interaction;
mod lim;
mod point;
mod text;
mod trace;

pub mod axis;
pub mod histogram;
pub mod layer;
pub mod plot;
pub mod scale;
pub mod theme;
pub mod ticker;
pub mod title;

pub use crate::{
    axis::{Axis, AxisLabel, AxisSide},
    clip::{Cuts, PlotBox},
    histogram::{Histogram, HistogramType},
    interaction::{Button, Gesture, Modifier},
    layer::{ContourType, Layer, PointSet},
    lim::{InvalidLim, Lim},
    plot::{GridLines, LogScale, Margins, Plot, MAIN_LAYER_ID},
    point::Point,
    scale::{Scale, Transform},
    text::{draw_text, HAlign, TextStyle, VAlign},
    ticker::{Tick, TickSet, TickSpec},
    title::Title,
    trace::Trace,
};

type ArcStr = std::sync::Arc<str>;

/// The item for index `idx` of a list that repeats as often as needed.
///
/// # Panics
///
/// Panics if `items` is empty.
pub(crate) fn cycled<T: Copy>(items: &[T], idx: usize) -> T {
    items[idx % items.len()]
}
