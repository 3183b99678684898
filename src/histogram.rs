use crate::{
    cycled,
    text::{draw_text, HAlign, TextStyle, VAlign},
    theme, Point, Trace,
};
use piet::{
    kurbo::{Line, Rect, Size},
    Color, RenderContext,
};

/// Which way the bars of a histogram grow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HistogramType {
    /// Bars rise from a horizontal baseline. Bar positions are read from x.
    Vertical,
    /// Bars extend from a vertical baseline. Bar positions are read from y.
    Horizontal,
}

impl Default for HistogramType {
    fn default() -> Self {
        HistogramType::Vertical
    }
}

/// Bars drawn at a sequence of plot-space points.
///
/// Each bar is as wide as it can be while keeping the configured separation from its neighbours.
#[derive(Debug, Clone)]
pub struct Histogram {
    kind: HistogramType,
    /// The size of the plotting box.
    dim: Size,
    plot_points: Vec<Point>,
    /// Where the bars start from, in plot space.
    plot_base_point: Point,
    visible: bool,
    /// Gaps between consecutive bars, cycled.
    separations: Vec<f64>,
    bg_colors: Vec<Color>,
    line_colors: Vec<Color>,
    line_widths: Vec<f64>,

    // retained
    left_sides: Vec<f64>,
    right_sides: Vec<f64>,

    labels_offset: f64,
    draw_labels: bool,
    rotate_labels: bool,
    font: TextStyle,
}

impl Histogram {
    pub fn new(kind: HistogramType, dim: Size, plot_points: impl Into<Vec<Point>>) -> Self {
        let mut hist = Histogram {
            kind,
            dim,
            plot_points: plot_points.into(),
            plot_base_point: Point::new(0., 0.),
            visible: true,
            separations: vec![theme::BAR_SEPARATION],
            bg_colors: vec![theme::BAR_COLOR],
            line_colors: vec![theme::BAR_LINE_COLOR],
            line_widths: vec![1.],
            left_sides: vec![],
            right_sides: vec![],
            labels_offset: 8.,
            draw_labels: false,
            rotate_labels: false,
            font: TextStyle::new(theme::FONT_COLOR, theme::FONT_SIZE),
        };
        hist.update_sides();
        hist
    }

    pub fn kind(&self) -> HistogramType {
        self.kind
    }

    pub fn plot_points(&self) -> &[Point] {
        &self.plot_points
    }

    /// How far each bar extends before its point, along the bar axis.
    pub fn left_sides(&self) -> &[f64] {
        &self.left_sides
    }

    /// How far each bar extends after its point, along the bar axis.
    pub fn right_sides(&self) -> &[f64] {
        &self.right_sides
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The rectangle of bar `idx`, clamped to the plotting box. `None` for invalid points.
    pub fn bar(&self, idx: usize) -> Option<Rect> {
        let point = self.plot_points.get(idx)?;
        if !point.is_valid() {
            return None;
        }
        let (x, y) = (point.x(), point.y());
        let (left, right) = (self.left_sides[idx], self.right_sides[idx]);
        let (x1, y1, x2, y2) = match self.kind {
            HistogramType::Vertical => (x - left, y, x + right, self.baseline()),
            HistogramType::Horizontal => (self.baseline(), y - left, x, y + right),
        };
        let clamp_x = |x: f64| x.max(0.).min(self.dim.width);
        let clamp_y = |y: f64| y.min(0.).max(-self.dim.height);
        Some(Rect::new(clamp_x(x1), clamp_y(y1), clamp_x(x2), clamp_y(y2)))
    }

    fn baseline(&self) -> f64 {
        let base = &self.plot_base_point;
        match (base.is_valid(), self.kind) {
            (false, _) => 0.,
            (true, HistogramType::Vertical) => base.y(),
            (true, HistogramType::Horizontal) => base.x(),
        }
    }

    fn update_sides(&mut self) {
        let n = self.plot_points.len();
        self.left_sides.clear();
        self.right_sides.clear();
        match n {
            0 => (),
            1 => {
                let half = 0.2
                    * match self.kind {
                        HistogramType::Vertical => self.dim.width,
                        HistogramType::Horizontal => self.dim.height,
                    };
                self.left_sides.push(half);
                self.right_sides.push(half);
            }
            _ => {
                let kind = self.kind;
                let separations = &self.separations;
                let diffs: Vec<f64> = self
                    .plot_points
                    .windows(2)
                    .enumerate()
                    .map(|(i, pair)| {
                        let (this, next) = (&pair[0], &pair[1]);
                        if !(this.is_valid() && next.is_valid()) {
                            return 0.;
                        }
                        let sep = cycled(separations, i);
                        let diff = match kind {
                            HistogramType::Vertical => next.x() - this.x(),
                            HistogramType::Horizontal => next.y() - this.y(),
                        };
                        if diff > 0. {
                            (diff - sep) / 2.
                        } else {
                            (diff + sep) / 2.
                        }
                    })
                    .collect();
                // The end bars are symmetric about their only neighbour gap.
                self.left_sides.push(diffs[0]);
                self.right_sides.push(diffs[0]);
                for pair in diffs.windows(2) {
                    self.left_sides.push(pair[0]);
                    self.right_sides.push(pair[1]);
                }
                self.left_sides.push(diffs[n - 2]);
                self.right_sides.push(diffs[n - 2]);
            }
        }
    }

    pub fn set_type(&mut self, kind: HistogramType) {
        if kind != self.kind {
            self.kind = kind;
            self.update_sides();
        }
    }

    /// Ignored unless both sides are positive.
    pub fn set_dim(&mut self, dim: Size) {
        if dim.width > 0. && dim.height > 0. {
            self.dim = dim;
            self.update_sides();
        } else {
            log::warn!("ignoring non-positive histogram size {:?}", dim);
        }
    }

    pub fn set_plot_points(&mut self, plot_points: &[Point]) {
        self.plot_points.clear();
        self.plot_points.extend_from_slice(plot_points);
        self.update_sides();
    }

    /// Replace point `idx`, or append if `idx == len`.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn set_plot_point(&mut self, idx: usize, point: Point) {
        let len = self.plot_points.len();
        assert!(idx <= len, "histogram point {} out of range (len {})", idx, len);
        if idx == len {
            self.plot_points.push(point);
        } else {
            self.plot_points[idx] = point;
        }
        self.update_sides();
    }

    pub fn add_plot_point(&mut self, point: Point) {
        self.plot_points.push(point);
        self.update_sides();
    }

    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn insert_plot_point(&mut self, idx: usize, point: Point) {
        self.plot_points.insert(idx, point);
        self.update_sides();
    }

    /// # Panics
    ///
    /// Panics if `idx >= len`.
    pub fn remove_plot_point(&mut self, idx: usize) {
        let len = self.plot_points.len();
        assert!(idx < len, "histogram point {} out of range (len {})", idx, len);
        self.plot_points.remove(idx);
        self.update_sides();
    }

    pub fn set_plot_base_point(&mut self, base: Point) {
        self.plot_base_point = base;
    }

    pub fn set_separations(&mut self, separations: impl Into<Vec<f64>>) {
        let separations = separations.into();
        if separations.is_empty() {
            log::warn!("ignoring empty list of bar separations");
            return;
        }
        self.separations = separations;
        self.update_sides();
    }

    pub fn set_bg_colors(&mut self, colors: impl Into<Vec<Color>>) {
        set_non_empty(&mut self.bg_colors, colors.into(), "bar colors");
    }

    pub fn set_line_colors(&mut self, colors: impl Into<Vec<Color>>) {
        set_non_empty(&mut self.line_colors, colors.into(), "bar line colors");
    }

    pub fn set_line_widths(&mut self, widths: impl Into<Vec<f64>>) {
        set_non_empty(&mut self.line_widths, widths.into(), "bar line widths");
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_labels_offset(&mut self, offset: f64) {
        self.labels_offset = offset;
    }

    pub fn set_draw_labels(&mut self, draw_labels: bool) {
        self.draw_labels = draw_labels;
    }

    pub fn set_rotate_labels(&mut self, rotate_labels: bool) {
        self.rotate_labels = rotate_labels;
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.font.color = color;
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size > 0. {
            self.font.size = size;
        }
    }

    /// Draw the bar labels, one per point on the bar axis.
    pub fn draw_labels<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        let (width, height) = (self.dim.width, self.dim.height);
        let offset = self.labels_offset;
        for point in self.plot_points.iter().filter(|p| p.is_valid()) {
            let label = point.label().clone();
            match (self.kind, self.rotate_labels) {
                (HistogramType::Vertical, rotated) if point.x() >= 0. && point.x() <= width => {
                    let anchor = (point.x(), offset).into();
                    let (h, v) = if rotated {
                        (HAlign::Right, VAlign::Center)
                    } else {
                        (HAlign::Center, VAlign::Top)
                    };
                    draw_text(rc, label, anchor, h, v, rotated, &self.font)?;
                }
                (HistogramType::Horizontal, rotated)
                    if -point.y() >= 0. && -point.y() <= height =>
                {
                    let anchor = (-offset, point.y()).into();
                    let (h, v) = if rotated {
                        (HAlign::Center, VAlign::Bottom)
                    } else {
                        (HAlign::Right, VAlign::Center)
                    };
                    draw_text(rc, label, anchor, h, v, rotated, &self.font)?;
                }
                _ => (),
            }
        }
        Ok(())
    }

    /// Whether a clamped bar is a sliver that should still be outlined.
    ///
    /// Slivers lying along the edge of the box are dropped.
    fn is_visible_sliver(&self, bar: Rect) -> bool {
        let (width, height) = (self.dim.width, self.dim.height);
        match self.kind {
            HistogramType::Vertical => {
                bar.x1 != bar.x0 && !(bar.y0 == bar.y1 && (bar.y0 == 0. || bar.y0 == -height))
            }
            HistogramType::Horizontal => {
                bar.y1 != bar.y0 && !(bar.x0 == bar.x1 && (bar.x0 == 0. || bar.x0 == width))
            }
        }
    }
}

impl Trace for Histogram {
    fn draw<RC: RenderContext>(&self, rc: &mut RC) -> Result<(), piet::Error> {
        if !self.visible {
            return Ok(());
        }
        for idx in 0..self.plot_points.len() {
            let bar = match self.bar(idx) {
                Some(bar) => bar,
                None => continue,
            };
            let width = cycled(&self.line_widths, idx);
            let bg = cycled(&self.bg_colors, idx);
            let line = cycled(&self.line_colors, idx);
            if bar.width().abs() > 2. * width && bar.height().abs() > 2. * width {
                rc.fill(bar, &bg);
                rc.stroke(bar, &line, width);
            } else if self.is_visible_sliver(bar) {
                rc.fill(bar, &bg);
                let (x1, y1, x2, y2) = (bar.x0, bar.y0, bar.x1, bar.y1);
                let edges = [
                    Line::new((x1, y1), (x1, y2)),
                    Line::new((x2, y1), (x2, y2)),
                    Line::new((x1, y1), (x2, y1)),
                    Line::new((x1, y2), (x2, y2)),
                ];
                for edge in &edges {
                    rc.stroke(*edge, &line, width);
                }
            }
        }
        if self.draw_labels {
            self.draw_labels(rc)?;
        }
        Ok(())
    }
}

fn set_non_empty<T>(dst: &mut Vec<T>, src: Vec<T>, what: &str) {
    if src.is_empty() {
        log::warn!("ignoring empty list of {}", what);
    } else {
        *dst = src;
    }
}
