use crate::{
    scale::Scale,
    text::{draw_text, HAlign, TextStyle, VAlign},
    theme,
    ticker::{self, Tick, TickSet, TickSpec},
    ArcStr, Lim,
};
use itertools::izip;
use piet::{
    kurbo::{Line, Point, Size},
    Color, LineCap, RenderContext, StrokeStyle,
};

/// Denotes where the axis will be drawn, relative to the plotting box.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AxisSide {
    Bottom,
    Top,
    Left,
    Right,
}

impl AxisSide {
    /// Horizontal axes show the x limits, vertical ones the y limits.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, AxisSide::Bottom | AxisSide::Top)
    }

    /// Map a position along the axis and a distance away from the box into plot space.
    fn outward(self, dim: Size, along: f64, out: f64) -> Point {
        match self {
            AxisSide::Bottom => Point::new(along, out),
            AxisSide::Top => Point::new(along, -dim.height - out),
            AxisSide::Left => Point::new(-out, along),
            AxisSide::Right => Point::new(dim.width + out, along),
        }
    }

    /// The plot-space position of the far end of an axis on this side.
    fn end(self, dim: Size) -> f64 {
        if self.is_horizontal() {
            dim.width
        } else {
            -dim.height
        }
    }

    /// How tick labels sit against their anchor, reading away from the box.
    fn tick_label_align(self, rotated: bool) -> (HAlign, VAlign) {
        match (self, rotated) {
            (AxisSide::Bottom, false) => (HAlign::Center, VAlign::Top),
            (AxisSide::Bottom, true) => (HAlign::Right, VAlign::Center),
            (AxisSide::Top, false) => (HAlign::Center, VAlign::Bottom),
            (AxisSide::Top, true) => (HAlign::Left, VAlign::Center),
            (AxisSide::Left, false) => (HAlign::Right, VAlign::Center),
            (AxisSide::Left, true) => (HAlign::Center, VAlign::Bottom),
            (AxisSide::Right, false) => (HAlign::Left, VAlign::Center),
            (AxisSide::Right, true) => (HAlign::Center, VAlign::Top),
        }
    }
}

pub(crate) fn square_cap() -> StrokeStyle {
    StrokeStyle::new().line_cap(LineCap::Square)
}

/// The title of an axis.
#[derive(Debug, Clone)]
pub struct AxisLabel {
    side: AxisSide,
    dim: Size,
    /// Position along the axis, as a fraction of its length.
    relative_pos: f64,
    offset: f64,
    rotate: bool,
    text: ArcStr,
    /// Alignment along the axis.
    align: HAlign,
    font: TextStyle,
}

impl AxisLabel {
    pub fn new(side: AxisSide, dim: Size) -> Self {
        AxisLabel {
            side,
            dim,
            relative_pos: 0.5,
            offset: 35.,
            rotate: !side.is_horizontal(),
            text: "".into(),
            align: HAlign::Center,
            font: TextStyle::new(theme::FONT_COLOR, theme::TITLE_FONT_SIZE),
        }
    }

    /// The position along the axis in plot space.
    pub fn plot_pos(&self) -> f64 {
        self.relative_pos * self.side.end(self.dim)
    }

    pub fn text(&self) -> &ArcStr {
        &self.text
    }

    pub fn set_dim(&mut self, dim: Size) {
        if dim.width > 0. && dim.height > 0. {
            self.dim = dim;
        }
    }

    pub fn set_relative_pos(&mut self, relative_pos: f64) {
        self.relative_pos = relative_pos;
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_rotate(&mut self, rotate: bool) {
        self.rotate = rotate;
    }

    pub fn set_text(&mut self, text: impl Into<ArcStr>) {
        self.text = text.into();
    }

    pub fn set_text_alignment(&mut self, align: HAlign) {
        self.align = align;
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.font.color = color;
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size > 0. {
            self.font.size = size;
        }
    }

    pub fn draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let anchor = self.side.outward(self.dim, self.plot_pos(), self.offset);
        let (h, v) = match (self.side, self.rotate) {
            (AxisSide::Bottom, false) => (self.align, VAlign::Top),
            (AxisSide::Top, false) => (self.align, VAlign::Bottom),
            (AxisSide::Left, true) => (self.align, VAlign::Bottom),
            (AxisSide::Right, true) => (self.align, VAlign::Top),
            (side, rotated) => side.tick_label_align(rotated),
        };
        draw_text(rc, self.text.clone(), anchor, h, v, self.rotate, &self.font)
    }
}

/// One of the four axes around the plotting box.
///
/// The axis keeps its ticks in sync with its limits: whenever the limits or the scale type change
/// the ticks are regenerated, unless they have been pinned with [`Axis::set_ticks`] or
/// [`Axis::set_tick_labels`].
#[derive(Debug, Clone)]
pub struct Axis {
    side: AxisSide,
    dim: Size,
    lim: Lim,
    log: bool,

    // style
    offset: f64,
    line_color: Color,
    line_width: f64,
    tick_length: f64,
    small_tick_length: f64,
    tick_label_offset: f64,
    exp_tick_labels: bool,
    rotate_tick_labels: bool,
    draw_tick_labels: bool,
    draw_axis_label: bool,
    font: TextStyle,

    /// How ticks are generated when they are not pinned. Never `Explicit`.
    spec: TickSpec,
    fixed_ticks: bool,
    label: AxisLabel,

    // retained
    ticks: TickSet,
    plot_ticks: Vec<f64>,
    ticks_inside: Vec<bool>,
    tick_labels: Vec<ArcStr>,
    /// The labels came from [`Axis::set_tick_labels`].
    custom_tick_labels: bool,
}

impl Axis {
    /// Create a new axis. Limits that cannot be shown on a log axis are replaced by `(0.1, 10)`.
    pub fn new(side: AxisSide, dim: Size, lim: Lim, log: bool) -> Self {
        let lim = if log { lim.or_log_default() } else { lim };
        let mut axis = Axis {
            side,
            dim,
            lim,
            log,
            offset: 5.,
            line_color: theme::AXES_COLOR,
            line_width: 1.,
            tick_length: 3.,
            small_tick_length: 2.,
            tick_label_offset: 7.,
            exp_tick_labels: false,
            rotate_tick_labels: !side.is_horizontal(),
            draw_tick_labels: matches!(side, AxisSide::Bottom | AxisSide::Left),
            draw_axis_label: true,
            font: TextStyle::new(theme::FONT_COLOR, theme::FONT_SIZE),
            spec: TickSpec::default(),
            fixed_ticks: false,
            label: AxisLabel::new(side, dim),
            ticks: TickSet::default(),
            plot_ticks: vec![],
            ticks_inside: vec![],
            tick_labels: vec![],
            custom_tick_labels: false,
        };
        axis.update_ticks();
        axis.update_positions();
        axis
    }

    pub fn side(&self) -> AxisSide {
        self.side
    }

    pub fn lim(&self) -> Lim {
        self.lim
    }

    pub fn is_log(&self) -> bool {
        self.log
    }

    pub fn scale(&self) -> Scale {
        if self.side.is_horizontal() {
            Scale::horizontal(self.dim, self.lim, self.log)
        } else {
            Scale::vertical(self.dim, self.lim, self.log)
        }
    }

    fn update_ticks(&mut self) {
        self.ticks = ticker::compute_ticks(self.lim, self.log, &self.spec);
        self.custom_tick_labels = false;
        self.update_labels();
    }

    fn update_labels(&mut self) {
        self.tick_labels = ticker::tick_labels(&self.ticks, self.log, self.exp_tick_labels);
    }

    fn update_positions(&mut self) {
        self.plot_ticks = ticker::plot_ticks(&self.ticks.values, &self.scale());
        let len = self.side.end(self.dim).abs();
        let sign = self.side.end(self.dim).signum();
        self.ticks_inside = self
            .plot_ticks
            .iter()
            .map(|&pos| {
                let pos = sign * pos;
                pos >= 0. && pos <= len
            })
            .collect();
    }

    fn refresh(&mut self) {
        if !self.fixed_ticks {
            self.update_ticks();
        }
        self.update_positions();
    }

    /// Ignored unless both sides are positive.
    pub fn set_dim(&mut self, dim: Size) {
        if dim.width > 0. && dim.height > 0. {
            self.dim = dim;
            self.label.set_dim(dim);
            self.update_positions();
        } else {
            log::warn!("ignoring non-positive axis size {:?}", dim);
        }
    }

    /// Ignored (with a warning) if the axis is logarithmic and the limits are not positive.
    pub fn set_lim(&mut self, lim: Lim) {
        self.set_lim_and_log(lim, self.log);
    }

    pub fn set_lim_and_log(&mut self, lim: Lim, log: bool) {
        if log && !lim.is_log_compatible() {
            log::warn!("limits {:?} are not allowed on a log axis", lim);
            return;
        }
        self.lim = lim;
        self.log = log;
        self.refresh();
    }

    pub fn set_log(&mut self, log: bool) {
        if log == self.log {
            return;
        }
        self.log = log;
        if log {
            self.lim = self.lim.or_log_default();
        }
        self.refresh();
    }

    /// Change the limits keeping the tick step and phase, as when panning.
    pub fn move_lim(&mut self, lim: Lim) {
        if self.log && !lim.is_log_compatible() {
            log::warn!("limits {:?} are not allowed on a log axis", lim);
            return;
        }
        self.lim = lim;
        if !self.fixed_ticks {
            if self.log {
                self.ticks = ticker::log_ticks(lim);
            } else if !self.ticks.values.is_empty() {
                match ticker::move_linear_ticks(&self.ticks.values, lim, &self.spec) {
                    Some(moved) => {
                        if moved.precision != self.ticks.precision {
                            log::warn!(
                                "tick precision changed while moving limits: {:?} -> {:?}",
                                self.ticks.precision,
                                moved.precision
                            );
                        }
                        self.ticks = moved;
                    }
                    None => self.ticks = ticker::compute_ticks(lim, false, &self.spec),
                }
            }
            self.update_labels();
        }
        self.update_positions();
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.line_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        if width > 0. {
            self.line_width = width;
        }
    }

    /// Aim for `n` intervals between ticks, unpinning the ticks.
    pub fn set_n_ticks(&mut self, n: usize) {
        self.spec = TickSpec::Count(n);
        self.fixed_ticks = false;
        if !self.log {
            self.refresh();
        }
    }

    /// Put ticks exactly `sep` apart, unpinning the ticks.
    ///
    /// Ignored (with a warning) unless `sep` is positive.
    pub fn set_ticks_separation(&mut self, sep: f64) {
        if !(sep > 0. && sep.is_finite()) {
            log::warn!("ignoring tick separation {}", sep);
            return;
        }
        self.spec = TickSpec::Separation(sep);
        self.fixed_ticks = false;
        if !self.log {
            self.refresh();
        }
    }

    /// Pin the ticks to `values`.
    pub fn set_ticks(&mut self, values: impl Into<Vec<f64>>) {
        self.ticks = TickSet {
            values: values.into(),
            precision: None,
        };
        self.fixed_ticks = true;
        self.custom_tick_labels = false;
        self.update_labels();
        self.update_positions();
    }

    /// Replace the tick labels, pinning the ticks.
    ///
    /// Ignored (with a warning) unless there is one label per tick.
    pub fn set_tick_labels<L: Into<ArcStr>>(&mut self, labels: impl IntoIterator<Item = L>) {
        let labels: Vec<ArcStr> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.tick_labels.len() {
            log::warn!(
                "expected {} tick labels, got {}",
                self.tick_labels.len(),
                labels.len()
            );
            return;
        }
        self.tick_labels = labels;
        self.custom_tick_labels = true;
        self.fixed_ticks = true;
        self.ticks.precision = None;
    }

    /// Unpinning the ticks regenerates them.
    pub fn set_fixed_ticks(&mut self, fixed: bool) {
        if fixed != self.fixed_ticks {
            self.fixed_ticks = fixed;
            if !fixed {
                self.refresh();
            }
        }
    }

    pub fn set_tick_spec(&mut self, spec: TickSpec) {
        match spec {
            TickSpec::Count(n) => self.set_n_ticks(n),
            TickSpec::Separation(sep) => self.set_ticks_separation(sep),
            TickSpec::Explicit(values) => self.set_ticks(values),
        }
    }

    /// The current way ticks are chosen; `Explicit` when they are pinned.
    pub fn tick_spec(&self) -> TickSpec {
        if self.fixed_ticks {
            TickSpec::Explicit(self.ticks.values.clone())
        } else {
            self.spec.clone()
        }
    }

    pub fn is_fixed_ticks(&self) -> bool {
        self.fixed_ticks
    }

    /// The tick values: all of them when pinned, otherwise only those inside the box.
    pub fn ticks(&self) -> Vec<f64> {
        self.visible(&self.ticks.values)
    }

    /// The tick positions in plot space, filtered like [`Axis::ticks`].
    pub fn plot_ticks(&self) -> Vec<f64> {
        self.visible(&self.plot_ticks)
    }

    fn visible(&self, values: &[f64]) -> Vec<f64> {
        if self.fixed_ticks {
            values.to_vec()
        } else {
            izip!(values, &self.ticks_inside)
                .filter(|(_, &inside)| inside)
                .map(|(&v, _)| v)
                .collect()
        }
    }

    /// All the tick values, with the precision they were computed at.
    pub fn tick_set(&self) -> &TickSet {
        &self.ticks
    }

    pub fn tick_labels(&self) -> &[ArcStr] {
        &self.tick_labels
    }

    /// Every tick, including those outside the box.
    pub fn tick_marks(&self) -> impl Iterator<Item = Tick> + '_ {
        izip!(
            &self.ticks.values,
            &self.plot_ticks,
            &self.ticks_inside,
            &self.tick_labels
        )
        .map(|(&value, &pos, &inside, label)| Tick {
            value,
            pos,
            inside,
            label: label.clone(),
        })
    }

    /// Custom labels from [`Axis::set_tick_labels`] are kept as they are.
    pub fn set_exp_tick_labels(&mut self, exp: bool) {
        if exp != self.exp_tick_labels {
            self.exp_tick_labels = exp;
            if !self.custom_tick_labels {
                self.update_labels();
            }
        }
    }

    pub fn set_rotate_tick_labels(&mut self, rotate: bool) {
        self.rotate_tick_labels = rotate;
    }

    pub fn set_draw_tick_labels(&mut self, draw: bool) {
        self.draw_tick_labels = draw;
    }

    pub fn set_tick_length(&mut self, len: f64) {
        self.tick_length = len;
    }

    pub fn set_small_tick_length(&mut self, len: f64) {
        self.small_tick_length = len;
    }

    pub fn set_tick_label_offset(&mut self, offset: f64) {
        self.tick_label_offset = offset;
    }

    pub fn set_draw_axis_label(&mut self, draw: bool) {
        self.draw_axis_label = draw;
    }

    pub fn set_axis_label_text(&mut self, text: impl Into<ArcStr>) {
        self.label.set_text(text);
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.font.color = color;
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size > 0. {
            self.font.size = size;
        }
    }

    /// Set the font of both the tick labels and the axis label.
    pub fn set_all_font_properties(&mut self, color: Color, size: f64) {
        self.set_font_color(color);
        self.set_font_size(size);
        self.label.set_font_color(color);
        self.label.set_font_size(size);
    }

    pub fn label(&self) -> &AxisLabel {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut AxisLabel {
        &mut self.label
    }

    /// Draw the axis line, its ticks, their labels and the axis label.
    pub fn draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let (side, dim) = (self.side, self.dim);
        let style = square_cap();
        let axis_line = Line::new(
            side.outward(dim, 0., self.offset),
            side.outward(dim, side.end(dim), self.offset),
        );
        rc.stroke_styled(axis_line, &self.line_color, self.line_width, &style);

        let inside = || self.tick_marks().filter(|tick| tick.inside);
        for tick in inside() {
            let len = if self.log && tick.label.is_empty() {
                self.small_tick_length
            } else {
                self.tick_length
            };
            let mark = Line::new(
                side.outward(dim, tick.pos, self.offset),
                side.outward(dim, tick.pos, self.offset + len),
            );
            rc.stroke_styled(mark, &self.line_color, self.line_width, &style);
        }

        if self.draw_tick_labels {
            let (h, v) = side.tick_label_align(self.rotate_tick_labels);
            let out = self.offset + self.tick_label_offset;
            for tick in inside() {
                let anchor = side.outward(dim, tick.pos, out);
                draw_text(rc, tick.label, anchor, h, v, self.rotate_tick_labels, &self.font)?;
            }
        }

        if self.draw_axis_label {
            self.label.draw(rc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(side: AxisSide, lo: f64, hi: f64, log: bool) -> Axis {
        Axis::new(side, Size::new(400., 200.), Lim::new(lo, hi), log)
    }

    #[test]
    fn ticks_follow_limits() {
        let mut x = axis(AxisSide::Bottom, 0., 1., false);
        assert_eq!(x.ticks(), vec![0., 0.2, 0.4, 0.6, 0.8, 1.]);
        assert_eq!(&*x.tick_labels()[1], "0.2");
        assert_eq!(x.plot_ticks()[5], 400.);

        x.set_lim(Lim::new(0., 10.));
        assert_eq!(x.ticks(), vec![0., 2., 4., 6., 8., 10.]);
        assert_eq!(&*x.tick_labels()[1], "2");
    }

    #[test]
    fn vertical_ticks_are_negative() {
        let y = axis(AxisSide::Left, 0., 10., false);
        assert_eq!(y.plot_ticks(), vec![0., -40., -80., -120., -160., -200.]);
        assert!(y.tick_marks().all(|t| t.inside));
    }

    #[test]
    fn log_axis() {
        let mut y = axis(AxisSide::Right, -1., 10., true);
        assert_eq!(y.lim(), Lim::new(0.1, 10.));
        assert_eq!(y.tick_set().values.len(), 19);
        // rejected, the old limits stay
        y.set_lim(Lim::new(0., 5.));
        assert_eq!(y.lim(), Lim::new(0.1, 10.));
        // switching to linear keeps the limits
        y.set_log(false);
        assert_eq!(y.ticks(), vec![1., 3., 5., 7., 9.]);
    }

    #[test]
    fn pinning() {
        let mut x = axis(AxisSide::Top, 0., 1., false);
        x.set_ticks(vec![0.5, 2.]);
        assert!(x.is_fixed_ticks());
        // pinned ticks are returned even when outside the box
        assert_eq!(x.ticks(), vec![0.5, 2.]);
        assert_eq!(x.tick_spec(), TickSpec::Explicit(vec![0.5, 2.]));
        x.set_lim(Lim::new(0., 100.));
        assert_eq!(x.ticks(), vec![0.5, 2.]);
        assert_eq!(x.plot_ticks(), vec![2., 8.]);

        x.set_tick_labels(vec!["a"]);
        assert_eq!(&*x.tick_labels()[0], "0.5");
        x.set_tick_labels(vec!["a", "b"]);
        assert_eq!(&*x.tick_labels()[1], "b");

        x.set_fixed_ticks(false);
        assert_eq!(x.tick_spec(), TickSpec::Count(5));
        assert_eq!(x.ticks().len(), 6);
    }

    #[test]
    fn custom_labels_survive_exp_labels() {
        let mut x = axis(AxisSide::Bottom, 1., 1000., true);
        x.set_ticks(vec![1., 10., 100.]);
        x.set_tick_labels(vec!["one", "ten", "hundred"]);
        x.set_exp_tick_labels(true);
        assert_eq!(&*x.tick_labels()[1], "ten");
        // new ticks get generated labels again
        x.set_ticks(vec![10.]);
        assert_eq!(&*x.tick_labels()[0], "1e1");
    }

    #[test]
    fn separation() {
        let mut x = axis(AxisSide::Bottom, 0., 1., false);
        x.set_ticks_separation(0.25);
        assert_eq!(x.ticks(), vec![0., 0.25, 0.5, 0.75, 1.]);
        assert_eq!(&*x.tick_labels()[2], "0.50");
        x.set_ticks_separation(-1.);
        assert_eq!(x.tick_spec(), TickSpec::Separation(0.25));
        x.set_tick_spec(TickSpec::Count(2));
        assert_eq!(x.ticks(), vec![0., 0.5, 1.]);
    }

    #[test]
    fn moving_keeps_the_grid() {
        let mut x = axis(AxisSide::Bottom, 0., 10., false);
        x.move_lim(Lim::new(0.5, 10.5));
        assert_eq!(x.ticks(), vec![2., 4., 6., 8., 10.]);
        x.move_lim(Lim::new(-3.5, 6.5));
        assert_eq!(x.ticks(), vec![-2., 0., 2., 4., 6.]);
    }

    #[test]
    fn label_position() {
        let mut y = axis(AxisSide::Left, 0., 1., false);
        assert_eq!(y.label().plot_pos(), -100.);
        y.label_mut().set_relative_pos(0.25);
        y.set_dim(Size::new(100., 40.));
        assert_eq!(y.label().plot_pos(), -10.);
    }

    #[test]
    fn draws_every_side() -> Result<(), piet::Error> {
        let mut rc = piet::NullRenderContext::new();
        for &side in &[AxisSide::Bottom, AxisSide::Top, AxisSide::Left, AxisSide::Right] {
            let mut axis = axis(side, 1., 1000., true);
            axis.set_draw_tick_labels(true);
            axis.set_axis_label_text("value");
            axis.draw(&mut rc)?;
            axis.set_rotate_tick_labels(side.is_horizontal());
            axis.draw(&mut rc)?;
        }
        Ok(())
    }
}
