use crate::{
    axis::square_cap,
    clip::PlotBox,
    cycled,
    histogram::{Histogram, HistogramType},
    lim,
    scale::Transform,
    text::{draw_text, HAlign, TextStyle, VAlign},
    theme, ArcStr, Lim, Point, Trace,
};
use itertools::izip;
use piet::{
    kurbo::{self, BezPath, Circle, Line, Rect, Size, Vec2},
    Color, RenderContext,
};
use std::fmt;

/// Which baseline a filled contour reaches.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContourType {
    /// The area between the line and a horizontal line at some y value.
    Horizontal,
    /// The area between the line and a vertical line at some x value.
    Vertical,
}

/// Data points together with their plot-space images and whether each image is inside the box.
///
/// The three sequences always have the same length.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point>,
    plot_points: Vec<Point>,
    inside: Vec<bool>,
}

impl PointSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn plot_points(&self) -> &[Point] {
        &self.plot_points
    }

    pub fn inside(&self) -> &[bool] {
        &self.inside
    }

    /// `(point, plot_point, inside)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &Point, bool)> {
        izip!(&self.points, &self.plot_points, &self.inside).map(|(p, pp, &ins)| (p, pp, ins))
    }

    fn image(point: &Point, transform: &Transform, plot_box: &PlotBox) -> (Point, bool) {
        let plot = transform.to_plot_point(point);
        let inside = plot.is_valid() && plot_box.contains(plot.pos());
        (plot, inside)
    }

    /// Recompute every plot point and inside flag.
    fn rebuild(&mut self, transform: &Transform, plot_box: &PlotBox) {
        transform.to_plot_all(&self.points, &mut self.plot_points);
        self.inside.clear();
        self.inside.extend(
            self.plot_points
                .iter()
                .map(|p| p.is_valid() && plot_box.contains(p.pos())),
        );
    }

    fn set(&mut self, points: Vec<Point>, transform: &Transform, plot_box: &PlotBox) {
        self.points = points;
        self.rebuild(transform, plot_box);
    }

    fn replace(&mut self, idx: usize, point: Point, transform: &Transform, plot_box: &PlotBox) {
        let (plot, inside) = Self::image(&point, transform, plot_box);
        self.points[idx] = point;
        self.plot_points[idx] = plot;
        self.inside[idx] = inside;
    }

    fn insert(&mut self, idx: usize, point: Point, transform: &Transform, plot_box: &PlotBox) {
        let (plot, inside) = Self::image(&point, transform, plot_box);
        self.points.insert(idx, point);
        self.plot_points.insert(idx, plot);
        self.inside.insert(idx, inside);
    }

    fn remove(&mut self, idx: usize) -> Point {
        self.plot_points.remove(idx);
        self.inside.remove(idx);
        self.points.remove(idx)
    }
}

/// One data series of a plot.
///
/// A layer owns its points, maps them into the plotting box, and knows how to draw them as points,
/// lines, filled contours or a histogram.
#[derive(Debug, Clone)]
pub struct Layer {
    id: ArcStr,
    dim: Size,
    x_lim: Lim,
    y_lim: Lim,
    x_log: bool,
    y_log: bool,
    points: PointSet,

    // style
    point_colors: Vec<Color>,
    point_sizes: Vec<f64>,
    line_color: Color,
    line_width: f64,
    label_bg_color: Color,
    label_separation: Vec2,
    font: TextStyle,

    hist: Option<Histogram>,
    /// Where histogram bars start from, in data space.
    hist_base_point: Point,
}

impl Layer {
    /// A new, empty layer. Limits that cannot be shown on a log scale are replaced by `(0.1, 10)`.
    pub fn new(
        id: impl Into<ArcStr>,
        dim: Size,
        x_lim: Lim,
        y_lim: Lim,
        x_log: bool,
        y_log: bool,
    ) -> Self {
        Layer {
            id: id.into(),
            dim,
            x_lim: if x_log { x_lim.or_log_default() } else { x_lim },
            y_lim: if y_log { y_lim.or_log_default() } else { y_lim },
            x_log,
            y_log,
            points: PointSet::default(),
            point_colors: vec![theme::POINT_COLOR],
            point_sizes: vec![theme::POINT_SIZE],
            line_color: theme::LINE_COLOR,
            line_width: 1.,
            label_bg_color: theme::LABEL_BG_COLOR,
            label_separation: Vec2::new(7., 7.),
            font: TextStyle::new(theme::FONT_COLOR, theme::FONT_SIZE),
            hist: None,
            hist_base_point: Point::new(0., 0.),
        }
    }

    /// A layer over the default `(0, 1)` limits.
    pub fn with_points(id: impl Into<ArcStr>, dim: Size, points: impl Into<Vec<Point>>) -> Self {
        let mut layer = Layer::new(id, dim, Lim::default(), Lim::default(), false, false);
        layer.set_points(points);
        layer
    }

    pub fn id(&self) -> &ArcStr {
        &self.id
    }

    pub fn is_id(&self, id: &str) -> bool {
        &*self.id == id
    }

    pub fn dim(&self) -> Size {
        self.dim
    }

    pub fn x_lim(&self) -> Lim {
        self.x_lim
    }

    pub fn y_lim(&self) -> Lim {
        self.y_lim
    }

    pub fn x_log(&self) -> bool {
        self.x_log
    }

    pub fn y_log(&self) -> bool {
        self.y_log
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.dim, self.x_lim, self.y_lim, self.x_log, self.y_log)
    }

    pub fn plot_box(&self) -> PlotBox {
        PlotBox::new(self.dim)
    }

    pub fn value_to_plot(&self, x: f64, y: f64) -> kurbo::Point {
        self.transform().to_plot(x, y)
    }

    /// The plot-space image of `point`, keeping its label.
    pub fn value_to_plot_point(&self, point: &Point) -> Point {
        self.transform().to_plot_point(point)
    }

    pub fn plot_to_value(&self, plot: kurbo::Point) -> (f64, f64) {
        self.transform().to_value(plot)
    }

    /// Whether a plot-space position is valid and inside the box.
    pub fn is_inside(&self, plot: kurbo::Point) -> bool {
        self.plot_box().contains(plot)
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }

    pub fn plot_points(&self) -> &[Point] {
        self.points.plot_points()
    }

    pub fn inside(&self) -> &[bool] {
        self.points.inside()
    }

    pub fn point_set(&self) -> &PointSet {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The index of the point drawn closest to `plot`, if `plot` falls on one.
    ///
    /// A point is hit within the radius of its marker, and never less than 5 pixels away.
    pub fn point_index_at_plot_pos(&self, plot: kurbo::Point) -> Option<usize> {
        if !self.is_inside(plot) {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (idx, (_, plot_point, inside)) in self.points.iter().enumerate() {
            if !inside {
                continue;
            }
            let dist_sq = (plot_point.pos() - plot).hypot2();
            let radius = 0.5 * cycled(&self.point_sizes, idx);
            if dist_sq < (radius * radius).max(25.)
                && best.map_or(true, |(_, best_sq)| dist_sq < best_sq)
            {
                best = Some((idx, dist_sq));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn point_at_plot_pos(&self, plot: kurbo::Point) -> Option<&Point> {
        self.point_index_at_plot_pos(plot)
            .map(|idx| &self.points.points()[idx])
    }

    /// Recompute every plot point, and the histogram with them.
    fn update(&mut self) {
        let (transform, plot_box) = (self.transform(), self.plot_box());
        self.points.rebuild(&transform, &plot_box);
        self.sync_histogram();
    }

    fn sync_histogram(&mut self) {
        let base = self.value_to_plot_point(&self.hist_base_point);
        if let Some(hist) = &mut self.hist {
            hist.set_plot_points(self.points.plot_points());
            hist.set_plot_base_point(base);
        }
    }

    /// Ignored unless both sides are positive.
    pub fn set_dim(&mut self, dim: Size) {
        if !(dim.width > 0. && dim.height > 0.) {
            log::warn!("ignoring non-positive layer size {:?}", dim);
            return;
        }
        self.dim = dim;
        if let Some(hist) = &mut self.hist {
            hist.set_dim(dim);
        }
        self.update();
    }

    /// Takes a [`Lim`] or a `(lo, hi)` pair. Ignored (with a warning) if the ends are equal or
    /// not finite, and on a log axis unless both limits are positive.
    pub fn set_x_lim<L>(&mut self, lim: L)
    where
        L: TryInto<Lim>,
        L::Error: fmt::Display,
    {
        let lim = match lim::accepted(lim) {
            Some(lim) => lim,
            None => return,
        };
        if check_log_lim(lim, self.x_log) {
            self.x_lim = lim;
            self.update();
        }
    }

    /// Takes a [`Lim`] or a `(lo, hi)` pair. Ignored (with a warning) if the ends are equal or
    /// not finite, and on a log axis unless both limits are positive.
    pub fn set_y_lim<L>(&mut self, lim: L)
    where
        L: TryInto<Lim>,
        L::Error: fmt::Display,
    {
        let lim = match lim::accepted(lim) {
            Some(lim) => lim,
            None => return,
        };
        if check_log_lim(lim, self.y_log) {
            self.y_lim = lim;
            self.update();
        }
    }

    /// Set both limits. Each one is checked separately.
    pub fn set_xy_lim(&mut self, x_lim: Lim, y_lim: Lim) {
        if check_log_lim(x_lim, self.x_log) {
            self.x_lim = x_lim;
        }
        if check_log_lim(y_lim, self.y_log) {
            self.y_lim = y_lim;
        }
        self.update();
    }

    /// Set limits and scale types together. Each axis is checked separately.
    pub fn set_lim_and_log(&mut self, x_lim: Lim, y_lim: Lim, x_log: bool, y_log: bool) {
        if check_log_lim(x_lim, x_log) {
            self.x_lim = x_lim;
            self.x_log = x_log;
        }
        if check_log_lim(y_lim, y_log) {
            self.y_lim = y_lim;
            self.y_log = y_log;
        }
        self.update();
    }

    pub fn set_x_log(&mut self, log: bool) {
        if log != self.x_log {
            self.x_log = log;
            if log {
                self.x_lim = self.x_lim.or_log_default();
            }
            self.update();
        }
    }

    pub fn set_y_log(&mut self, log: bool) {
        if log != self.y_log {
            self.y_log = log;
            if log {
                self.y_lim = self.y_lim.or_log_default();
            }
            self.update();
        }
    }

    pub fn set_points(&mut self, points: impl Into<Vec<Point>>) {
        let (transform, plot_box) = (self.transform(), self.plot_box());
        self.points.set(points.into(), &transform, &plot_box);
        self.sync_histogram();
    }

    /// Replace point `idx`, or append when `idx == len`.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn set_point(&mut self, idx: usize, point: Point) {
        let len = self.len();
        assert!(idx <= len, "point {} out of range (len {})", idx, len);
        if idx == len {
            return self.add_point(point);
        }
        let (transform, plot_box) = (self.transform(), self.plot_box());
        self.points.replace(idx, point, &transform, &plot_box);
        if let Some(hist) = &mut self.hist {
            hist.set_plot_point(idx, self.points.plot_points()[idx].clone());
        }
    }

    pub fn add_point(&mut self, point: Point) {
        let idx = self.len();
        let (transform, plot_box) = (self.transform(), self.plot_box());
        self.points.insert(idx, point, &transform, &plot_box);
        if let Some(hist) = &mut self.hist {
            hist.add_plot_point(self.points.plot_points()[idx].clone());
        }
    }

    pub fn add_points(&mut self, points: impl IntoIterator<Item = Point>) {
        let (transform, plot_box) = (self.transform(), self.plot_box());
        for point in points {
            self.points
                .insert(self.points.len(), point, &transform, &plot_box);
        }
        self.sync_histogram();
    }

    /// Insert a point before `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn insert_point(&mut self, idx: usize, point: Point) {
        let len = self.len();
        assert!(idx <= len, "point {} out of range (len {})", idx, len);
        let (transform, plot_box) = (self.transform(), self.plot_box());
        self.points.insert(idx, point, &transform, &plot_box);
        if let Some(hist) = &mut self.hist {
            hist.insert_plot_point(idx, self.points.plot_points()[idx].clone());
        }
    }

    /// # Panics
    ///
    /// Panics if `idx >= len`.
    pub fn remove_point(&mut self, idx: usize) -> Point {
        let len = self.len();
        assert!(idx < len, "point {} out of range (len {})", idx, len);
        if let Some(hist) = &mut self.hist {
            hist.remove_plot_point(idx);
        }
        self.points.remove(idx)
    }

    pub fn set_point_colors(&mut self, colors: impl Into<Vec<Color>>) {
        let colors = colors.into();
        if colors.is_empty() {
            log::warn!("ignoring empty list of point colors");
        } else {
            self.point_colors = colors;
        }
    }

    pub fn set_point_color(&mut self, color: Color) {
        self.point_colors = vec![color];
    }

    /// Ignored (with a warning) if empty, or if any size is not positive and finite.
    pub fn set_point_sizes(&mut self, sizes: impl Into<Vec<f64>>) {
        let sizes = sizes.into();
        if sizes.is_empty() {
            log::warn!("ignoring empty list of point sizes");
        } else if !sizes.iter().copied().all(valid_size) {
            log::warn!("ignoring point sizes {:?}", sizes);
        } else {
            self.point_sizes = sizes;
        }
    }

    pub fn set_point_size(&mut self, size: f64) {
        self.set_point_sizes(vec![size]);
    }

    pub fn point_colors(&self) -> &[Color] {
        &self.point_colors
    }

    pub fn point_sizes(&self) -> &[f64] {
        &self.point_sizes
    }

    pub fn line_color(&self) -> Color {
        self.line_color
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.line_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        if width > 0. {
            self.line_width = width;
        }
    }

    pub fn set_label_bg_color(&mut self, color: Color) {
        self.label_bg_color = color;
    }

    /// How far labels are drawn right of and above their point.
    pub fn set_label_separation(&mut self, sep: Vec2) {
        self.label_separation = sep;
    }

    pub fn font(&self) -> &TextStyle {
        &self.font
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.font.color = color;
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size > 0. {
            self.font.size = size;
        }
    }

    /// Set the font of the point labels and of the histogram labels.
    pub fn set_all_font_properties(&mut self, color: Color, size: f64) {
        self.set_font_color(color);
        self.set_font_size(size);
        if let Some(hist) = &mut self.hist {
            hist.set_font_color(color);
            hist.set_font_size(size);
        }
    }

    /// Add a histogram over the points of this layer, replacing any previous one.
    pub fn start_histogram(&mut self, kind: HistogramType) {
        self.hist = Some(Histogram::new(kind, self.dim, self.points.plot_points()));
        self.sync_histogram();
    }

    pub fn histogram(&self) -> Option<&Histogram> {
        self.hist.as_ref()
    }

    pub fn histogram_mut(&mut self) -> Option<&mut Histogram> {
        self.hist.as_mut()
    }

    /// Where the histogram bars start from, in data space.
    pub fn set_hist_base_point(&mut self, base: Point) {
        self.hist_base_point = base;
        self.sync_histogram();
    }

    pub fn set_hist_type(&mut self, kind: HistogramType) {
        if let Some(hist) = &mut self.hist {
            hist.set_type(kind);
        }
    }

    pub fn set_hist_visible(&mut self, visible: bool) {
        if let Some(hist) = &mut self.hist {
            hist.set_visible(visible);
        }
    }

    pub fn set_draw_hist_labels(&mut self, draw: bool) {
        if let Some(hist) = &mut self.hist {
            hist.set_draw_labels(draw);
        }
    }

    /// Draw a marker at every point inside the box.
    pub fn draw_points<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        for (idx, (_, plot, inside)) in self.points.iter().enumerate() {
            if inside {
                let size = cycled(&self.point_sizes, idx);
                rc.fill(
                    Circle::new(plot.pos(), 0.5 * size),
                    &cycled(&self.point_colors, idx),
                );
            }
        }
        Ok(())
    }

    /// Draw a single data point with the first point colour and size.
    pub fn draw_point<RC: RenderContext>(
        &self,
        rc: &mut RC,
        point: &Point,
    ) -> Result<(), piet::Error> {
        self.draw_point_with(rc, point, self.point_colors[0], self.point_sizes[0])
    }

    pub fn draw_point_with<RC: RenderContext>(
        &self,
        rc: &mut RC,
        point: &Point,
        color: Color,
        size: f64,
    ) -> Result<(), piet::Error> {
        let plot = self.value_to_plot(point.x(), point.y());
        if self.is_inside(plot) {
            rc.fill(Circle::new(plot, 0.5 * size), &color);
        }
        Ok(())
    }

    /// Join consecutive points, clipped to the box.
    pub fn draw_lines<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let plot_box = self.plot_box();
        let style = square_cap();
        for pair in self.points.plot_points().windows(2) {
            if let Some((a, b)) = plot_box.clip_segment(pair[0].pos(), pair[1].pos()) {
                rc.stroke_styled(Line::new(a, b), &self.line_color, self.line_width, &style);
            }
        }
        Ok(())
    }

    /// Draw the line through two data points, clipped to the box.
    pub fn draw_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        p1: &Point,
        p2: &Point,
    ) -> Result<(), piet::Error> {
        self.draw_line_with(rc, p1, p2, self.line_color, self.line_width)
    }

    pub fn draw_line_with<RC: RenderContext>(
        &self,
        rc: &mut RC,
        p1: &Point,
        p2: &Point,
        color: Color,
        width: f64,
    ) -> Result<(), piet::Error> {
        let a = self.value_to_plot(p1.x(), p1.y());
        let b = self.value_to_plot(p2.x(), p2.y());
        if let Some((a, b)) = self.plot_box().clip_segment(a, b) {
            rc.stroke_styled(Line::new(a, b), &color, width, &square_cap());
        }
        Ok(())
    }

    /// The two data points at the ends of the x limits on `y = slope * x + y_cut`.
    ///
    /// On log axes the relation holds between the decimal logarithms, so the line stays straight.
    pub fn slope_line_ends(&self, slope: f64, y_cut: f64) -> (Point, Point) {
        let (x_log, y_log) = (self.x_log, self.y_log);
        let end = |x: f64| {
            let lx = if x_log { x.log10() } else { x };
            let ly = slope * lx + y_cut;
            Point::new(x, if y_log { 10f64.powf(ly) } else { ly })
        };
        (end(self.x_lim.lo()), end(self.x_lim.hi()))
    }

    pub fn draw_line_slope<RC: RenderContext>(
        &self,
        rc: &mut RC,
        slope: f64,
        y_cut: f64,
    ) -> Result<(), piet::Error> {
        self.draw_line_slope_with(rc, slope, y_cut, self.line_color, self.line_width)
    }

    pub fn draw_line_slope_with<RC: RenderContext>(
        &self,
        rc: &mut RC,
        slope: f64,
        y_cut: f64,
        color: Color,
        width: f64,
    ) -> Result<(), piet::Error> {
        let (p1, p2) = self.slope_line_ends(slope, y_cut);
        self.draw_line_with(rc, &p1, &p2, color, width)
    }

    pub fn draw_horizontal_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
    ) -> Result<(), piet::Error> {
        self.draw_horizontal_line_with(rc, value, self.line_color, self.line_width)
    }

    /// Draw a line across the box at y = `value`, if that is inside the limits.
    pub fn draw_horizontal_line_with<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
        color: Color,
        width: f64,
    ) -> Result<(), piet::Error> {
        let y = self.transform().y.to_plot(value);
        if y.is_finite() && -y >= 0. && -y <= self.dim.height {
            let line = Line::new((0., y), (self.dim.width, y));
            rc.stroke_styled(line, &color, width, &square_cap());
        }
        Ok(())
    }

    pub fn draw_vertical_line<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
    ) -> Result<(), piet::Error> {
        self.draw_vertical_line_with(rc, value, self.line_color, self.line_width)
    }

    /// Draw a line across the box at x = `value`, if that is inside the limits.
    pub fn draw_vertical_line_with<RC: RenderContext>(
        &self,
        rc: &mut RC,
        value: f64,
        color: Color,
        width: f64,
    ) -> Result<(), piet::Error> {
        let x = self.transform().x.to_plot(value);
        if x.is_finite() && x >= 0. && x <= self.dim.width {
            let line = Line::new((x, 0.), (x, -self.dim.height));
            rc.stroke_styled(line, &color, width, &square_cap());
        }
        Ok(())
    }

    /// The outline of the area between the points and the line at `reference`, in plot space.
    ///
    /// On a log axis a reference that is not positive is moved to the smallest limit.
    pub fn contour_shape(&self, kind: ContourType, reference: f64) -> Vec<kurbo::Point> {
        let plot_box = self.plot_box();
        let plot: Vec<kurbo::Point> = self.points.plot_points().iter().map(Point::pos).collect();
        let transform = self.transform();
        match kind {
            ContourType::Horizontal => {
                let reference = if self.y_log && reference <= 0. {
                    self.y_lim.min()
                } else {
                    reference
                };
                plot_box.horizontal_shape(&plot, transform.y.to_plot(reference))
            }
            ContourType::Vertical => {
                let reference = if self.x_log && reference <= 0. {
                    self.x_lim.min()
                } else {
                    reference
                };
                plot_box.vertical_shape(&plot, transform.x.to_plot(reference))
            }
        }
    }

    /// Fill the area between the points and the line at `reference` with the line colour.
    pub fn draw_filled_contour<RC: RenderContext>(
        &self,
        rc: &mut RC,
        kind: ContourType,
        reference: f64,
    ) -> Result<(), piet::Error> {
        let shape = self.contour_shape(kind, reference);
        if !shape.is_empty() {
            rc.fill(closed_path(&shape), &self.line_color);
        }
        Ok(())
    }

    /// Draw the label of a data point in a box next to it.
    pub fn draw_label<RC: RenderContext>(
        &self,
        rc: &mut RC,
        point: &Point,
    ) -> Result<(), piet::Error> {
        let plot = self.value_to_plot(point.x(), point.y());
        if !plot.is_finite() {
            return Ok(());
        }
        let pos = plot + Vec2::new(self.label_separation.x, -self.label_separation.y);
        let size = self.font.size;
        let delta = 0.25 * size;
        let text_width = self.font.measure(rc, point.label().clone())?.width;
        let bg = Rect::from_origin_size(
            (pos.x - delta, pos.y - size - delta),
            (text_width + 2. * delta, size + 2. * delta),
        );
        rc.fill(bg, &self.label_bg_color);
        draw_text(
            rc,
            point.label().clone(),
            pos,
            HAlign::Left,
            VAlign::Bottom,
            false,
            &self.font,
        )
    }

    /// Draw the label of the point under `plot`, if any.
    pub fn draw_label_at_plot_pos<RC: RenderContext>(
        &self,
        rc: &mut RC,
        plot: kurbo::Point,
    ) -> Result<(), piet::Error> {
        match self.point_at_plot_pos(plot) {
            Some(point) => self.draw_label(rc, point),
            None => Ok(()),
        }
    }

    pub fn draw_histogram<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        match &self.hist {
            Some(hist) => hist.draw(rc),
            None => Ok(()),
        }
    }

    /// Fill the polygon through the given data points, cropped to the box.
    pub fn draw_polygon<RC: RenderContext>(
        &self,
        rc: &mut RC,
        points: &[Point],
        color: Color,
    ) -> Result<(), piet::Error> {
        if points.len() < 3 {
            return Ok(());
        }
        let transform = self.transform();
        let plot: Vec<kurbo::Point> = points
            .iter()
            .map(|p| transform.to_plot(p.x(), p.y()))
            .collect();
        let cropped = self.plot_box().crop_polygon(&plot);
        if cropped.len() > 2 {
            rc.fill(closed_path(&cropped), &color);
        }
        Ok(())
    }

    /// Draw `text` at a data position, if that position is inside the box.
    pub fn draw_annotation<RC: RenderContext>(
        &self,
        rc: &mut RC,
        text: impl Into<ArcStr>,
        x: f64,
        y: f64,
        h: HAlign,
        v: VAlign,
    ) -> Result<(), piet::Error> {
        let mut plot = self.value_to_plot(x, y);
        if !self.is_inside(plot) {
            return Ok(());
        }
        // center on the font size rather than the layout box
        let v = if v == VAlign::Center {
            plot.y += 0.5 * self.font.size;
            VAlign::Bottom
        } else {
            v
        };
        draw_text(rc, text.into(), plot, h, v, false, &self.font)
    }
}

fn check_log_lim(lim: Lim, log: bool) -> bool {
    if log && !lim.is_log_compatible() {
        log::warn!("limits {:?} are not allowed on a log scale", lim);
        false
    } else {
        true
    }
}

#[inline]
fn valid_size(size: f64) -> bool {
    size > 0. && size.is_finite()
}

fn closed_path(points: &[kurbo::Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((&first, rest)) = points.split_first() {
        path.move_to(first);
        for &p in rest {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}
