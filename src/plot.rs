use crate::{
    axis::{square_cap, Axis, AxisSide},
    histogram::HistogramType,
    interaction::Interaction,
    layer::{ContourType, Layer},
    text::{HAlign, VAlign},
    theme,
    lim,
    title::Title,
    ArcStr, Lim, Point,
};
use itertools::izip;
use piet::{
    kurbo::{self, Affine, Line, Rect, Size, Vec2},
    Color, RenderContext,
};
use std::{fmt, iter};

const DEFAULT_OUTER_DIM: Size = Size::new(450., 300.);

/// The id of the layer every plot starts with.
pub const MAIN_LAYER_ID: &str = "main layer";

const LEGEND_RECT_SIZE: f64 = 14.;

/// Space around the plotting box, in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Margins {
    pub bottom: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
}

impl Margins {
    pub const fn new(bottom: f64, left: f64, top: f64, right: f64) -> Self {
        Margins {
            bottom,
            left,
            top,
            right,
        }
    }

    fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    fn vertical(&self) -> f64 {
        self.bottom + self.top
    }
}

impl Default for Margins {
    fn default() -> Self {
        Margins::new(60., 70., 40., 30.)
    }
}

/// Which axes use a logarithmic scale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogScale {
    None,
    X,
    Y,
    XY,
}

impl LogScale {
    /// Parse `""`, `"x"`, `"y"`, `"xy"` or `"yx"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(LogScale::None),
            "x" => Some(LogScale::X),
            "y" => Some(LogScale::Y),
            "xy" | "yx" => Some(LogScale::XY),
            _ => None,
        }
    }

    pub fn x(self) -> bool {
        matches!(self, LogScale::X | LogScale::XY)
    }

    pub fn y(self) -> bool {
        matches!(self, LogScale::Y | LogScale::XY)
    }
}

/// Which grid lines to draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GridLines {
    /// Lines at the ticks of the horizontal axes.
    Vertical,
    /// Lines at the ticks of the vertical axes.
    Horizontal,
    Both,
}

/// A 2D plot: the box, four axes, a title and any number of layers sharing the same limits.
///
/// Positions called `screen` are in the coordinates of the surface the plot is drawn on. Positions
/// called `plot` are relative to the bottom-left corner of the box, with y growing upwards as
/// negative values (see [`Trace`](crate::Trace)).
///
/// A plot is not synchronized; hosts that share one between threads must lock it.
#[derive(Debug, Clone)]
pub struct Plot {
    pos: kurbo::Point,
    outer_dim: Size,
    mar: Margins,
    dim: Size,
    x_lim: Lim,
    y_lim: Lim,
    fixed_x_lim: bool,
    fixed_y_lim: bool,
    x_log: bool,
    y_log: bool,
    inverted_x_scale: bool,
    inverted_y_scale: bool,
    include_all_layers_in_lim: bool,
    expand_lim_factor: f64,

    // style
    bg_color: Color,
    box_bg_color: Color,
    box_line_color: Color,
    box_line_width: f64,
    grid_line_color: Color,
    grid_line_width: f64,

    main_layer: Layer,
    layers: Vec<Layer>,

    x_axis: Axis,
    top_axis: Axis,
    y_axis: Axis,
    right_axis: Axis,
    title: Title,

    pub(crate) interaction: Interaction,
}

impl Default for Plot {
    fn default() -> Self {
        Plot::new(kurbo::Point::ZERO, DEFAULT_OUTER_DIM)
    }
}

impl Plot {
    /// A plot at `pos` taking up `outer_dim` on the screen, margins included.
    ///
    /// An `outer_dim` that leaves no room for the box inside the default margins is replaced by
    /// the default size, with a warning.
    pub fn new(pos: kurbo::Point, outer_dim: Size) -> Self {
        let mar = Margins::default();
        let inner = |outer: Size| {
            Size::new(
                outer.width - mar.horizontal(),
                outer.height - mar.vertical(),
            )
        };
        let mut outer_dim = outer_dim;
        let mut dim = inner(outer_dim);
        if !(dim.width > 0. && dim.height > 0.) {
            log::warn!(
                "outer size {:?} is too small for the margins, using {:?}",
                outer_dim,
                DEFAULT_OUTER_DIM
            );
            outer_dim = DEFAULT_OUTER_DIM;
            dim = inner(outer_dim);
        }
        let (x_lim, y_lim) = (Lim::default(), Lim::default());
        Plot {
            pos,
            outer_dim,
            mar,
            dim,
            x_lim,
            y_lim,
            fixed_x_lim: false,
            fixed_y_lim: false,
            x_log: false,
            y_log: false,
            inverted_x_scale: false,
            inverted_y_scale: false,
            include_all_layers_in_lim: true,
            expand_lim_factor: 0.1,
            bg_color: theme::BACKGROUND_COLOR,
            box_bg_color: theme::BOX_BG_COLOR,
            box_line_color: theme::BOX_LINE_COLOR,
            box_line_width: 1.,
            grid_line_color: theme::GRID_COLOR,
            grid_line_width: 1.,
            main_layer: Layer::new(MAIN_LAYER_ID, dim, x_lim, y_lim, false, false),
            layers: vec![],
            x_axis: Axis::new(AxisSide::Bottom, dim, x_lim, false),
            top_axis: Axis::new(AxisSide::Top, dim, x_lim, false),
            y_axis: Axis::new(AxisSide::Left, dim, y_lim, false),
            right_axis: Axis::new(AxisSide::Right, dim, y_lim, false),
            title: Title::new(dim),
            interaction: Interaction::default(),
        }
    }

    // Geometry

    pub fn pos(&self) -> kurbo::Point {
        self.pos
    }

    pub fn outer_dim(&self) -> Size {
        self.outer_dim
    }

    pub fn mar(&self) -> Margins {
        self.mar
    }

    /// The size of the plotting box.
    pub fn dim(&self) -> Size {
        self.dim
    }

    pub fn set_pos(&mut self, pos: kurbo::Point) {
        self.pos = pos;
    }

    /// Resize the whole plot, keeping the margins. Ignored if the box would vanish.
    pub fn set_outer_dim(&mut self, outer_dim: Size) {
        let dim = Size::new(
            outer_dim.width - self.mar.horizontal(),
            outer_dim.height - self.mar.vertical(),
        );
        if outer_dim.width > 0. && outer_dim.height > 0. && dim.width > 0. && dim.height > 0. {
            self.outer_dim = outer_dim;
            self.propagate_dim(dim);
        } else {
            log::warn!("ignoring outer size {:?}", outer_dim);
        }
    }

    /// Change the margins, keeping the size of the box.
    pub fn set_mar(&mut self, mar: Margins) {
        let outer_dim = Size::new(
            self.dim.width + mar.horizontal(),
            self.dim.height + mar.vertical(),
        );
        if outer_dim.width > 0. && outer_dim.height > 0. {
            self.mar = mar;
            self.outer_dim = outer_dim;
        } else {
            log::warn!("ignoring margins {:?}", mar);
        }
    }

    /// Resize the box, keeping the margins.
    pub fn set_dim(&mut self, dim: Size) {
        let outer_dim = Size::new(
            dim.width + self.mar.horizontal(),
            dim.height + self.mar.vertical(),
        );
        if dim.width > 0. && dim.height > 0. && outer_dim.width > 0. && outer_dim.height > 0. {
            self.outer_dim = outer_dim;
            self.propagate_dim(dim);
        } else {
            log::warn!("ignoring plot size {:?}", dim);
        }
    }

    fn propagate_dim(&mut self, dim: Size) {
        self.dim = dim;
        for axis in self.axes_mut() {
            axis.set_dim(dim);
        }
        self.title.set_dim(dim);
        for layer in self.all_layers_mut() {
            layer.set_dim(dim);
        }
    }

    // Screen mapping

    /// The screen position of the bottom-left corner of the box.
    fn origin(&self) -> Vec2 {
        Vec2::new(
            self.pos.x + self.mar.left,
            self.pos.y + self.mar.top + self.dim.height,
        )
    }

    pub fn plot_pos_at(&self, screen: kurbo::Point) -> kurbo::Point {
        screen - self.origin()
    }

    pub fn screen_pos_at_value(&self, x: f64, y: f64) -> kurbo::Point {
        self.main_layer.value_to_plot(x, y) + self.origin()
    }

    pub fn value_at(&self, screen: kurbo::Point) -> (f64, f64) {
        self.main_layer.plot_to_value(self.plot_pos_at(screen))
    }

    /// The position in the box as fractions of its size, from the bottom-left corner.
    pub fn relative_plot_pos_at(&self, screen: kurbo::Point) -> (f64, f64) {
        let plot = self.plot_pos_at(screen);
        (plot.x / self.dim.width, -plot.y / self.dim.height)
    }

    /// Whether `screen` is over the plot, margins included.
    pub fn is_over_plot(&self, screen: kurbo::Point) -> bool {
        screen.x >= self.pos.x
            && screen.x <= self.pos.x + self.outer_dim.width
            && screen.y >= self.pos.y
            && screen.y <= self.pos.y + self.outer_dim.height
    }

    /// Whether `screen` is over the box.
    pub fn is_over_box(&self, screen: kurbo::Point) -> bool {
        let x0 = self.pos.x + self.mar.left;
        let y0 = self.pos.y + self.mar.top;
        screen.x >= x0
            && screen.x <= x0 + self.dim.width
            && screen.y >= y0
            && screen.y <= y0 + self.dim.height
    }

    // Limits

    pub fn x_lim(&self) -> Lim {
        self.x_lim
    }

    pub fn y_lim(&self) -> Lim {
        self.y_lim
    }

    pub fn is_fixed_x_lim(&self) -> bool {
        self.fixed_x_lim
    }

    pub fn is_fixed_y_lim(&self) -> bool {
        self.fixed_y_lim
    }

    pub fn x_log(&self) -> bool {
        self.x_log
    }

    pub fn y_log(&self) -> bool {
        self.y_log
    }

    pub fn is_inverted_x_scale(&self) -> bool {
        self.inverted_x_scale
    }

    pub fn is_inverted_y_scale(&self) -> bool {
        self.inverted_y_scale
    }

    /// The range of the data along one direction, from the layers taking part in the limits.
    ///
    /// Points outside a pinned range of the other direction, and points that cannot be shown on a
    /// log scale, are left out.
    fn data_range(&self, horizontal: bool) -> Option<(f64, f64)> {
        let (log, other_fixed, other_lim) = if horizontal {
            (self.x_log, self.fixed_y_lim, self.y_lim)
        } else {
            (self.y_log, self.fixed_x_lim, self.x_lim)
        };
        let extra: &[Layer] = if self.include_all_layers_in_lim {
            &self.layers
        } else {
            &[]
        };
        iter::once(&self.main_layer)
            .chain(extra)
            .flat_map(|layer| layer.points())
            .filter(|p| p.is_valid())
            .filter_map(|p| {
                let (v, other) = if horizontal {
                    (p.x(), p.y())
                } else {
                    (p.y(), p.x())
                };
                let shown = !other_fixed || other_lim.contains(other);
                (shown && !(log && v <= 0.)).then(|| v)
            })
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// The limits fitting the data along one direction.
    fn fit_lim(&self, horizontal: bool) -> Lim {
        let (current, log, inverted) = if horizontal {
            (self.x_lim, self.x_log, self.inverted_x_scale)
        } else {
            (self.y_lim, self.y_log, self.inverted_y_scale)
        };
        let fitted = self
            .data_range(horizontal)
            .and_then(|(lo, hi)| expand_range(lo, hi, log, self.expand_lim_factor));
        let lim = match fitted {
            Some(lim) => lim,
            None if log => current.or_log_default(),
            None => current,
        };
        lim.oriented(inverted)
    }

    /// Fit the limits that are not pinned to the data, and pass the limits on to the layers.
    pub fn update_limits(&mut self) {
        if !self.fixed_x_lim {
            self.x_lim = self.fit_lim(true);
            log::debug!("x limits fitted to {:?}", self.x_lim);
            let lim = self.x_lim;
            for axis in self.horizontal_axes_mut() {
                axis.set_lim(lim);
            }
        }
        if !self.fixed_y_lim {
            self.y_lim = self.fit_lim(false);
            log::debug!("y limits fitted to {:?}", self.y_lim);
            let lim = self.y_lim;
            for axis in self.vertical_axes_mut() {
                axis.set_lim(lim);
            }
        }
        let (x_lim, y_lim) = (self.x_lim, self.y_lim);
        for layer in self.all_layers_mut() {
            layer.set_xy_lim(x_lim, y_lim);
        }
    }

    /// Pin the x limits. Their order decides whether the scale is inverted.
    ///
    /// Takes a [`Lim`] or a `(lo, hi)` pair. Equal or non-finite ends are ignored with a warning.
    pub fn set_x_lim<L>(&mut self, lim: L)
    where
        L: TryInto<Lim>,
        L::Error: fmt::Display,
    {
        let lim = match lim::accepted(lim) {
            Some(lim) => lim,
            None => return,
        };
        if self.x_log && !lim.is_log_compatible() {
            log::warn!("limits {:?} are not allowed on a log scale", lim);
            return;
        }
        self.x_lim = lim;
        self.inverted_x_scale = lim.is_inverted();
        self.fixed_x_lim = true;
        for axis in self.horizontal_axes_mut() {
            axis.set_lim(lim);
        }
        self.update_limits();
    }

    /// Pin the y limits. Their order decides whether the scale is inverted.
    ///
    /// Takes a [`Lim`] or a `(lo, hi)` pair. Equal or non-finite ends are ignored with a warning.
    pub fn set_y_lim<L>(&mut self, lim: L)
    where
        L: TryInto<Lim>,
        L::Error: fmt::Display,
    {
        let lim = match lim::accepted(lim) {
            Some(lim) => lim,
            None => return,
        };
        if self.y_log && !lim.is_log_compatible() {
            log::warn!("limits {:?} are not allowed on a log scale", lim);
            return;
        }
        self.y_lim = lim;
        self.inverted_y_scale = lim.is_inverted();
        self.fixed_y_lim = true;
        for axis in self.vertical_axes_mut() {
            axis.set_lim(lim);
        }
        self.update_limits();
    }

    pub fn set_fixed_x_lim(&mut self, fixed: bool) {
        self.fixed_x_lim = fixed;
        self.update_limits();
    }

    pub fn set_fixed_y_lim(&mut self, fixed: bool) {
        self.fixed_y_lim = fixed;
        self.update_limits();
    }

    /// Switch the axes between linear and logarithmic scales.
    ///
    /// Pinned limits that cannot be shown on the new scale are released.
    pub fn set_log_scale(&mut self, scale: LogScale) {
        let (x_log, y_log) = (scale.x(), scale.y());
        if x_log == self.x_log && y_log == self.y_log {
            return;
        }
        self.x_log = x_log;
        self.y_log = y_log;
        if x_log && self.fixed_x_lim && !self.x_lim.is_log_compatible() {
            self.fixed_x_lim = false;
        }
        if y_log && self.fixed_y_lim && !self.y_lim.is_log_compatible() {
            self.fixed_y_lim = false;
        }
        if !self.fixed_x_lim {
            self.x_lim = self.fit_lim(true);
        }
        if !self.fixed_y_lim {
            self.y_lim = self.fit_lim(false);
        }
        let (x_lim, y_lim) = (self.x_lim, self.y_lim);
        for axis in self.horizontal_axes_mut() {
            axis.set_lim_and_log(x_lim, x_log);
        }
        for axis in self.vertical_axes_mut() {
            axis.set_lim_and_log(y_lim, y_log);
        }
        for layer in self.all_layers_mut() {
            layer.set_lim_and_log(x_lim, y_lim, x_log, y_log);
        }
    }

    /// Like [`Plot::set_log_scale`] with one of `""`, `"x"`, `"y"`, `"xy"` or `"yx"`.
    ///
    /// Anything else is ignored with a warning.
    pub fn set_log_scale_str(&mut self, scale: &str) {
        match LogScale::parse(scale) {
            Some(scale) => self.set_log_scale(scale),
            None => log::warn!("unknown log scale {:?}", scale),
        }
    }

    pub fn set_inverted_x_scale(&mut self, inverted: bool) {
        if inverted == self.inverted_x_scale {
            return;
        }
        self.inverted_x_scale = inverted;
        self.x_lim = self.x_lim.reversed();
        let lim = self.x_lim;
        for axis in self.horizontal_axes_mut() {
            axis.set_lim(lim);
        }
        for layer in self.all_layers_mut() {
            layer.set_x_lim(lim);
        }
    }

    pub fn invert_x_scale(&mut self) {
        self.set_inverted_x_scale(!self.inverted_x_scale);
    }

    pub fn set_inverted_y_scale(&mut self, inverted: bool) {
        if inverted == self.inverted_y_scale {
            return;
        }
        self.inverted_y_scale = inverted;
        self.y_lim = self.y_lim.reversed();
        let lim = self.y_lim;
        for axis in self.vertical_axes_mut() {
            axis.set_lim(lim);
        }
        for layer in self.all_layers_mut() {
            layer.set_y_lim(lim);
        }
    }

    pub fn invert_y_scale(&mut self) {
        self.set_inverted_y_scale(!self.inverted_y_scale);
    }

    /// Whether the points of every layer, not just the main one, decide the fitted limits.
    pub fn set_include_all_layers_in_lim(&mut self, include: bool) {
        if include != self.include_all_layers_in_lim {
            self.include_all_layers_in_lim = include;
            self.update_limits();
        }
    }

    /// How far fitted limits reach past the data, as a fraction of its range. Negative factors are
    /// ignored.
    pub fn set_expand_lim_factor(&mut self, factor: f64) {
        if factor >= 0. && factor != self.expand_lim_factor {
            self.expand_lim_factor = factor;
            self.update_limits();
        } else if factor < 0. {
            log::warn!("ignoring negative expansion factor {}", factor);
        }
    }

    // Navigation

    /// Pin both limits to the navigated ones and pass them on.
    ///
    /// Limits that came out invalid leave that direction unchanged.
    fn navigate(&mut self, x_lim: Option<Lim>, y_lim: Option<Lim>, moving: bool) {
        self.fixed_x_lim = true;
        self.fixed_y_lim = true;
        if let Some(lim) = x_lim.filter(|lim| !self.x_log || lim.is_log_compatible()) {
            self.x_lim = lim;
            for axis in self.horizontal_axes_mut() {
                if moving {
                    axis.move_lim(lim);
                } else {
                    axis.set_lim(lim);
                }
            }
        }
        if let Some(lim) = y_lim.filter(|lim| !self.y_log || lim.is_log_compatible()) {
            self.y_lim = lim;
            for axis in self.vertical_axes_mut() {
                if moving {
                    axis.move_lim(lim);
                } else {
                    axis.set_lim(lim);
                }
            }
        }
        self.update_limits();
    }

    /// Shift the x limits by `delta` pixels.
    pub fn move_horizontal_axes_lim(&mut self, delta: f64) {
        let lim = shifted(self.x_lim, self.x_log, delta / self.dim.width);
        self.navigate(lim, None, true);
    }

    /// Shift the y limits by `delta` pixels.
    pub fn move_vertical_axes_lim(&mut self, delta: f64) {
        let lim = shifted(self.y_lim, self.y_log, delta / self.dim.height);
        self.navigate(None, lim, true);
    }

    /// Center the box on a value and zoom by `factor` (above 1 zooms in).
    pub fn center_and_zoom(&mut self, factor: f64, x: f64, y: f64) {
        let x_lim = zoomed(self.x_lim, self.x_log, factor, x, 0.);
        let y_lim = zoomed(self.y_lim, self.y_log, factor, y, 0.);
        self.navigate(x_lim, y_lim, false);
    }

    /// Zoom by `factor` around the center of the box.
    pub fn zoom(&mut self, factor: f64) {
        let center = kurbo::Point::new(0.5 * self.dim.width, -0.5 * self.dim.height);
        let (x, y) = self.main_layer.plot_to_value(center);
        self.center_and_zoom(factor, x, y);
    }

    /// Zoom by `factor`, keeping the value under `screen` where it is.
    pub fn zoom_at(&mut self, factor: f64, screen: kurbo::Point) {
        let plot = self.plot_pos_at(screen);
        let (x, y) = self.main_layer.plot_to_value(plot);
        let x_rel = 0.5 - plot.x / self.dim.width;
        let y_rel = 0.5 + plot.y / self.dim.height;
        let x_lim = zoomed(self.x_lim, self.x_log, factor, x, x_rel);
        let y_lim = zoomed(self.y_lim, self.y_log, factor, y, y_rel);
        self.navigate(x_lim, y_lim, false);
    }

    /// Move the limits so that what is drawn at plot position `from` ends up at `to`.
    pub fn shift_plot_pos(&mut self, from: kurbo::Point, to: kurbo::Point) {
        let delta = from - to;
        let x_lim = shifted(self.x_lim, self.x_log, delta.x / self.dim.width);
        let y_lim = shifted(self.y_lim, self.y_log, -delta.y / self.dim.height);
        self.navigate(x_lim, y_lim, true);
    }

    /// Move the limits so that the value `(x, y)` is drawn at `screen`.
    pub fn align(&mut self, (x, y): (f64, f64), screen: kurbo::Point) {
        let from = self.main_layer.value_to_plot(x, y);
        let to = self.plot_pos_at(screen);
        self.shift_plot_pos(from, to);
    }

    /// Move the limits so that what is drawn at `screen` ends up in the middle of the box.
    pub fn center(&mut self, screen: kurbo::Point) {
        let from = self.plot_pos_at(screen);
        let to = kurbo::Point::new(0.5 * self.dim.width, -0.5 * self.dim.height);
        self.shift_plot_pos(from, to);
    }

    // Layers

    pub fn main_layer(&self) -> &Layer {
        &self.main_layer
    }

    pub fn main_layer_mut(&mut self) -> &mut Layer {
        &mut self.main_layer
    }

    /// The layers added to the plot, without the main one.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn all_layers(&self) -> impl Iterator<Item = &Layer> {
        iter::once(&self.main_layer).chain(&self.layers)
    }

    fn all_layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        iter::once(&mut self.main_layer).chain(&mut self.layers)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.all_layers().find(|layer| layer.is_id(id))
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.all_layers_mut().find(|layer| layer.is_id(id))
    }

    /// Add a layer, fitted to the size, limits and scales of the plot.
    ///
    /// Returns `false`, leaving the plot untouched, if a layer with the same id exists.
    pub fn add_layer(&mut self, mut layer: Layer) -> bool {
        if self.layer(layer.id()).is_some() {
            log::warn!("a layer with id {:?} already exists", layer.id());
            return false;
        }
        layer.set_dim(self.dim);
        layer.set_lim_and_log(self.x_lim, self.y_lim, self.x_log, self.y_log);
        self.layers.push(layer);
        if self.include_all_layers_in_lim {
            self.update_limits();
        }
        true
    }

    pub fn add_layer_with_points(
        &mut self,
        id: impl Into<ArcStr>,
        points: impl Into<Vec<Point>>,
    ) -> bool {
        let mut layer = Layer::new(
            id,
            self.dim,
            self.x_lim,
            self.y_lim,
            self.x_log,
            self.y_log,
        );
        layer.set_points(points);
        self.add_layer(layer)
    }

    /// Remove a layer other than the main one.
    pub fn remove_layer(&mut self, id: &str) -> Option<Layer> {
        let idx = match self.layers.iter().position(|layer| layer.is_id(id)) {
            Some(idx) => idx,
            None => {
                log::warn!("no layer with id {:?} to remove", id);
                return None;
            }
        };
        let layer = self.layers.remove(idx);
        if self.include_all_layers_in_lim {
            self.update_limits();
        }
        Some(layer)
    }

    /// Run `f` on the layer called `id` and refit the limits.
    fn edit_layer<R>(&mut self, id: &str, f: impl FnOnce(&mut Layer) -> R) -> Option<R> {
        let out = match self.layer_mut(id) {
            Some(layer) => f(layer),
            None => {
                log::warn!("no layer with id {:?}", id);
                return None;
            }
        };
        self.update_limits();
        Some(out)
    }

    // Points

    pub fn set_points(&mut self, id: &str, points: impl Into<Vec<Point>>) {
        self.edit_layer(id, |layer| layer.set_points(points));
    }

    /// See [`Layer::set_point`].
    pub fn set_point(&mut self, id: &str, idx: usize, point: Point) {
        self.edit_layer(id, |layer| layer.set_point(idx, point));
    }

    pub fn add_point(&mut self, id: &str, point: Point) {
        self.edit_layer(id, |layer| layer.add_point(point));
    }

    pub fn add_points(&mut self, id: &str, points: impl IntoIterator<Item = Point>) {
        self.edit_layer(id, |layer| layer.add_points(points));
    }

    /// See [`Layer::insert_point`].
    pub fn insert_point(&mut self, id: &str, idx: usize, point: Point) {
        self.edit_layer(id, |layer| layer.insert_point(idx, point));
    }

    /// See [`Layer::remove_point`].
    pub fn remove_point(&mut self, id: &str, idx: usize) -> Option<Point> {
        self.edit_layer(id, |layer| layer.remove_point(idx))
    }

    /// The point of layer `id` drawn under `screen`.
    pub fn point_at(&self, id: &str, screen: kurbo::Point) -> Option<&Point> {
        let plot = self.plot_pos_at(screen);
        self.layer(id)?.point_at_plot_pos(plot)
    }

    /// Add the value under `screen` to layer `id`.
    pub fn add_point_at(&mut self, id: &str, screen: kurbo::Point) {
        let (x, y) = self.value_at(screen);
        self.add_point(id, Point::new(x, y));
    }

    /// Remove the point of layer `id` drawn under `screen`, if any.
    pub fn remove_point_at(&mut self, id: &str, screen: kurbo::Point) -> Option<Point> {
        let plot = self.plot_pos_at(screen);
        let idx = self.layer(id)?.point_index_at_plot_pos(plot)?;
        self.remove_point(id, idx)
    }

    // Style

    pub fn set_bg_color(&mut self, color: Color) {
        self.bg_color = color;
    }

    pub fn set_box_bg_color(&mut self, color: Color) {
        self.box_bg_color = color;
    }

    pub fn set_box_line_color(&mut self, color: Color) {
        self.box_line_color = color;
    }

    pub fn set_box_line_width(&mut self, width: f64) {
        if width > 0. {
            self.box_line_width = width;
        }
    }

    pub fn set_grid_line_color(&mut self, color: Color) {
        self.grid_line_color = color;
    }

    pub fn set_grid_line_width(&mut self, width: f64) {
        if width > 0. {
            self.grid_line_width = width;
        }
    }

    pub fn set_point_colors(&mut self, colors: impl Into<Vec<Color>>) {
        self.main_layer.set_point_colors(colors);
    }

    pub fn set_point_color(&mut self, color: Color) {
        self.main_layer.set_point_color(color);
    }

    pub fn set_point_sizes(&mut self, sizes: impl Into<Vec<f64>>) {
        self.main_layer.set_point_sizes(sizes);
    }

    pub fn set_point_size(&mut self, size: f64) {
        self.main_layer.set_point_size(size);
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.main_layer.set_line_color(color);
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.main_layer.set_line_width(width);
    }

    pub fn set_hist_base_point(&mut self, base: Point) {
        self.main_layer.set_hist_base_point(base);
    }

    pub fn set_hist_type(&mut self, kind: HistogramType) {
        self.main_layer.set_hist_type(kind);
    }

    pub fn set_hist_visible(&mut self, visible: bool) {
        self.main_layer.set_hist_visible(visible);
    }

    pub fn set_draw_hist_labels(&mut self, draw: bool) {
        self.main_layer.set_draw_hist_labels(draw);
    }

    pub fn set_label_bg_color(&mut self, color: Color) {
        self.main_layer.set_label_bg_color(color);
    }

    pub fn set_label_separation(&mut self, sep: Vec2) {
        self.main_layer.set_label_separation(sep);
    }

    /// The font of the main layer labels.
    pub fn set_font_color(&mut self, color: Color) {
        self.main_layer.set_font_color(color);
    }

    /// The font of the main layer labels.
    pub fn set_font_size(&mut self, size: f64) {
        self.main_layer.set_font_size(size);
    }

    /// Set the font of everything in the plot.
    pub fn set_all_font_properties(&mut self, color: Color, size: f64) {
        for axis in self.axes_mut() {
            axis.set_all_font_properties(color, size);
        }
        self.title.set_font_color(color);
        self.title.set_font_size(size);
        for layer in self.all_layers_mut() {
            layer.set_all_font_properties(color, size);
        }
    }

    // Axes and title

    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    pub fn x_axis_mut(&mut self) -> &mut Axis {
        &mut self.x_axis
    }

    pub fn top_axis(&self) -> &Axis {
        &self.top_axis
    }

    pub fn top_axis_mut(&mut self) -> &mut Axis {
        &mut self.top_axis
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    pub fn y_axis_mut(&mut self) -> &mut Axis {
        &mut self.y_axis
    }

    pub fn right_axis(&self) -> &Axis {
        &self.right_axis
    }

    pub fn right_axis_mut(&mut self) -> &mut Axis {
        &mut self.right_axis
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn title_mut(&mut self) -> &mut Title {
        &mut self.title
    }

    fn horizontal_axes_mut(&mut self) -> [&mut Axis; 2] {
        [&mut self.x_axis, &mut self.top_axis]
    }

    fn vertical_axes_mut(&mut self) -> [&mut Axis; 2] {
        [&mut self.y_axis, &mut self.right_axis]
    }

    fn axes_mut(&mut self) -> [&mut Axis; 4] {
        [
            &mut self.x_axis,
            &mut self.top_axis,
            &mut self.y_axis,
            &mut self.right_axis,
        ]
    }

    pub fn set_horizontal_axes_n_ticks(&mut self, n: usize) {
        for axis in self.horizontal_axes_mut() {
            axis.set_n_ticks(n);
        }
    }

    pub fn set_horizontal_axes_ticks_separation(&mut self, sep: f64) {
        for axis in self.horizontal_axes_mut() {
            axis.set_ticks_separation(sep);
        }
    }

    /// Pin the ticks of the horizontal axes.
    pub fn set_horizontal_axes_ticks(&mut self, ticks: &[f64]) {
        for axis in self.horizontal_axes_mut() {
            axis.set_ticks(ticks);
        }
    }

    pub fn set_vertical_axes_n_ticks(&mut self, n: usize) {
        for axis in self.vertical_axes_mut() {
            axis.set_n_ticks(n);
        }
    }

    pub fn set_vertical_axes_ticks_separation(&mut self, sep: f64) {
        for axis in self.vertical_axes_mut() {
            axis.set_ticks_separation(sep);
        }
    }

    /// Pin the ticks of the vertical axes.
    pub fn set_vertical_axes_ticks(&mut self, ticks: &[f64]) {
        for axis in self.vertical_axes_mut() {
            axis.set_ticks(ticks);
        }
    }

    pub fn set_axes_offset(&mut self, offset: f64) {
        for axis in self.axes_mut() {
            axis.set_offset(offset);
        }
    }

    pub fn set_ticks_length(&mut self, len: f64) {
        for axis in self.axes_mut() {
            axis.set_tick_length(len);
        }
    }

    pub fn set_title_text(&mut self, text: impl Into<ArcStr>) {
        self.title.set_text(text);
    }

    /// Add a histogram to every layer.
    pub fn start_histograms(&mut self, kind: HistogramType) {
        for layer in self.all_layers_mut() {
            layer.start_histogram(kind);
        }
    }

    // Drawing

    /// Draw the background, box, bottom and left axes, title, lines and points.
    pub fn default_draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.begin_draw(rc, |rc| {
            self.draw_background(rc)?;
            self.draw_box(rc)?;
            self.draw_x_axis(rc)?;
            self.draw_y_axis(rc)?;
            self.draw_title(rc)?;
            self.draw_lines(rc)?;
            self.draw_points(rc)
        })
    }

    /// Run `f` with the origin moved to the bottom-left corner of the box.
    ///
    /// The other drawing methods expect to be called inside `f`.
    pub fn begin_draw<RC, F>(&self, rc: &mut RC, f: F) -> Result<(), piet::Error>
    where
        RC: RenderContext,
        F: FnOnce(&mut RC) -> Result<(), piet::Error>,
    {
        rc.with_save(|rc| {
            rc.transform(Affine::translate(self.origin()));
            f(rc)
        })
    }

    pub fn draw_background<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let rect = Rect::from_origin_size(
            (-self.mar.left, -self.mar.top - self.dim.height),
            self.outer_dim,
        );
        rc.fill(rect, &self.bg_color);
        Ok(())
    }

    pub fn draw_box<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let rect = Rect::from_origin_size((0., -self.dim.height), self.dim);
        rc.fill(rect, &self.box_bg_color);
        rc.stroke_styled(
            rect,
            &self.box_line_color,
            self.box_line_width,
            &square_cap(),
        );
        Ok(())
    }

    pub fn draw_x_axis<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.x_axis.draw(rc)
    }

    pub fn draw_y_axis<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.y_axis.draw(rc)
    }

    pub fn draw_top_axis<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.top_axis.draw(rc)
    }

    pub fn draw_right_axis<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.right_axis.draw(rc)
    }

    pub fn draw_title<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        self.title.draw(rc)
    }

    /// Draw grid lines at the ticks inside the box.
    pub fn draw_grid_lines<RC: RenderContext>(
        &self,
        rc: &mut RC,
        grid: GridLines,
    ) -> Result<(), piet::Error> {
        let (w, h) = (self.dim.width, self.dim.height);
        let style = square_cap();
        if matches!(grid, GridLines::Vertical | GridLines::Both) {
            for x in self.x_axis.plot_ticks() {
                if x >= 0. && x <= w {
                    let line = Line::new((x, 0.), (x, -h));
                    rc.stroke_styled(line, &self.grid_line_color, self.grid_line_width, &style);
                }
            }
        }
        if matches!(grid, GridLines::Horizontal | GridLines::Both) {
            for y in self.y_axis.plot_ticks() {
                if -y >= 0. && -y <= h {
                    let line = Line::new((0., y), (w, y));
                    rc.stroke_styled(line, &self.grid_line_color, self.grid_line_width, &style);
                }
            }
        }
        Ok(())
    }

    /// Draw the points of every layer.
    pub fn draw_points<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        for layer in self.all_layers() {
            layer.draw_points(rc)?;
        }
        Ok(())
    }

    pub fn draw_lines<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        for layer in self.all_layers() {
            layer.draw_lines(rc)?;
        }
        Ok(())
    }

    pub fn draw_filled_contours<RC: RenderContext>(
        &self,
        rc: &mut RC,
        kind: ContourType,
        reference: f64,
    ) -> Result<(), piet::Error> {
        for layer in self.all_layers() {
            layer.draw_filled_contour(rc, kind, reference)?;
        }
        Ok(())
    }

    pub fn draw_histograms<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        for layer in self.all_layers() {
            layer.draw_histogram(rc)?;
        }
        Ok(())
    }

    /// Draw the labels of the points under `screen`, in every layer.
    pub fn draw_labels_at<RC: RenderContext>(
        &self,
        rc: &mut RC,
        screen: kurbo::Point,
    ) -> Result<(), piet::Error> {
        let plot = self.plot_pos_at(screen);
        for layer in self.all_layers() {
            layer.draw_label_at_plot_pos(rc, plot)?;
        }
        Ok(())
    }

    /// Draw the labels of the points under the pointer, while point labeling is in progress.
    pub fn draw_labels<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        match self.labeling_pos() {
            Some(screen) => self.draw_labels_at(rc, screen),
            None => Ok(()),
        }
    }

    /// Draw a legend: one entry per layer, main layer first, each placed at a position relative
    /// to the box.
    pub fn draw_legend<RC: RenderContext>(
        &self,
        rc: &mut RC,
        texts: &[&str],
        x_rel: &[f64],
        y_rel: &[f64],
    ) -> Result<(), piet::Error> {
        for (layer, &text, &xr, &yr) in izip!(self.all_layers(), texts, x_rel, y_rel) {
            let center = kurbo::Point::new(xr * self.dim.width, -yr * self.dim.height);
            let rect = Rect::from_center_size(center, (LEGEND_RECT_SIZE, LEGEND_RECT_SIZE));
            rc.fill(rect, &layer.line_color());
            let (x, y) = layer.plot_to_value(center + Vec2::new(LEGEND_RECT_SIZE, 0.));
            layer.draw_annotation(rc, text, x, y, HAlign::Left, VAlign::Center)?;
        }
        Ok(())
    }

    pub fn draw_point<RC: RenderContext>(
        &self,
        rc: &mut RC,
        point: &Point,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_point(rc, point)
    }

    pub fn draw_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        p1: &Point,
        p2: &Point,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_line(rc, p1, p2)
    }

    pub fn draw_line_slope<RC: RenderContext>(
        &self,
        rc: &mut RC,
        slope: f64,
        y_cut: f64,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_line_slope(rc, slope, y_cut)
    }

    pub fn draw_horizontal_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_horizontal_line(rc, value)
    }

    pub fn draw_vertical_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_vertical_line(rc, value)
    }

    pub fn draw_label<RC: RenderContext>(
        &self,
        rc: &mut RC,
        point: &Point,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_label(rc, point)
    }

    pub fn draw_polygon<RC: RenderContext>(
        &self,
        rc: &mut RC,
        points: &[Point],
        color: Color,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_polygon(rc, points, color)
    }

    pub fn draw_annotation<RC: RenderContext>(
        &self,
        rc: &mut RC,
        text: impl Into<ArcStr>,
        x: f64,
        y: f64,
        h: HAlign,
        v: VAlign,
    ) -> Result<(), piet::Error> {
        self.main_layer.draw_annotation(rc, text, x, y, h, v)
    }
}

/// Widen `lo..hi` by `factor` of its range on each side, or by the matching ratio on a log scale.
///
/// A single value is widened by a tenth of itself (or to `±0.1` around zero).
fn expand_range(lo: f64, hi: f64, log: bool, factor: f64) -> Option<Lim> {
    let (lo, hi) = if log {
        let ratio = if lo == hi {
            1.1
        } else {
            (factor * (hi / lo).ln()).exp()
        };
        (lo / ratio, hi * ratio)
    } else {
        let delta = if lo == hi {
            if lo == 0. {
                0.1
            } else {
                0.1 * lo.abs()
            }
        } else {
            factor * (hi - lo)
        };
        (lo - delta, hi + delta)
    };
    Lim::try_new(lo, hi)
}

/// `lim` zoomed by `factor` around `value`, with `value` sitting `offset` (a fraction of the new
/// span) before the middle.
fn zoomed(lim: Lim, log: bool, factor: f64, value: f64, offset: f64) -> Option<Lim> {
    let (lo, hi) = if log {
        let span = lim.log_span();
        let delta = (span / (2. * factor)).exp();
        let offset = (span / factor * offset).exp();
        (value * offset / delta, value * offset * delta)
    } else {
        let delta = lim.span() / (2. * factor);
        let offset = 2. * delta * offset;
        (value + offset - delta, value + offset + delta)
    };
    let out = Lim::try_new(lo, hi);
    if out.is_none() {
        log::warn!("zooming {:?} by {} gave invalid limits", lim, factor);
    }
    out
}

/// `lim` moved by `frac` of its span.
fn shifted(lim: Lim, log: bool, frac: f64) -> Option<Lim> {
    let (lo, hi) = if log {
        let delta = (lim.log_span() * frac).exp();
        (lim.lo() * delta, lim.hi() * delta)
    } else {
        let delta = lim.span() * frac;
        (lim.lo() + delta, lim.hi() + delta)
    };
    Lim::try_new(lo, hi)
}
