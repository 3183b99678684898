//! Mapping between data values and plot-space pixels.
//!
//! Plot space has its origin at the bottom-left corner of the plotting box. X grows to the right
//! and Y grows *downwards*, so every point inside the box has `y <= 0`.
use crate::{Lim, Point};
use piet::kurbo::{self, Size};

/// Maps values along one axis onto a pixel distance.
///
/// `len` is signed: horizontal scales use the box width, vertical scales the negated box height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scale {
    pub len: f64,
    pub lim: Lim,
    pub log: bool,
}

impl Scale {
    pub fn new(len: f64, lim: Lim, log: bool) -> Self {
        Scale { len, lim, log }
    }

    /// The horizontal scale of a box of size `dim`.
    pub fn horizontal(dim: Size, lim: Lim, log: bool) -> Self {
        Scale::new(dim.width, lim, log)
    }

    /// The vertical scale of a box of size `dim`.
    pub fn vertical(dim: Size, lim: Lim, log: bool) -> Self {
        Scale::new(-dim.height, lim, log)
    }

    /// Data value to pixel offset.
    ///
    /// On a log scale, values `<= 0` map to a non-finite result.
    #[inline]
    pub fn to_plot(&self, value: f64) -> f64 {
        if self.log {
            self.len * (value / self.lim.lo()).ln() / self.lim.log_span()
        } else {
            self.len * (value - self.lim.lo()) / self.lim.span()
        }
    }

    /// Pixel offset to data value.
    #[inline]
    pub fn to_value(&self, plot: f64) -> f64 {
        if self.log {
            (self.lim.lo().ln() + self.lim.log_span() * plot / self.len).exp()
        } else {
            self.lim.lo() + self.lim.span() * plot / self.len
        }
    }
}

/// The pair of scales of a plotting box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub x: Scale,
    pub y: Scale,
}

impl Transform {
    pub fn new(dim: Size, x_lim: Lim, y_lim: Lim, x_log: bool, y_log: bool) -> Self {
        Transform {
            x: Scale::horizontal(dim, x_lim, x_log),
            y: Scale::vertical(dim, y_lim, y_log),
        }
    }

    #[inline]
    pub fn to_plot(&self, x: f64, y: f64) -> kurbo::Point {
        kurbo::Point::new(self.x.to_plot(x), self.y.to_plot(y))
    }

    #[inline]
    pub fn to_value(&self, plot: kurbo::Point) -> (f64, f64) {
        (self.x.to_value(plot.x), self.y.to_value(plot.y))
    }

    /// Transform a point, keeping its label.
    pub fn to_plot_point(&self, point: &Point) -> Point {
        Point::with_label(
            self.x.to_plot(point.x()),
            self.y.to_plot(point.y()),
            point.label().clone(),
        )
    }

    /// Transform a sequence of points into `out`, replacing its contents.
    ///
    /// The scale types are checked once for the whole sequence.
    pub fn to_plot_all(&self, points: &[Point], out: &mut Vec<Point>) {
        out.clear();
        out.reserve(points.len());
        let (x_lo, x_len) = (self.x.lim.lo(), self.x.len);
        let (y_lo, y_len) = (self.y.lim.lo(), self.y.len);
        match (self.x.log, self.y.log) {
            (false, false) => {
                let (x_span, y_span) = (self.x.lim.span(), self.y.lim.span());
                out.extend(points.iter().map(|p| {
                    Point::with_label(
                        x_len * (p.x() - x_lo) / x_span,
                        y_len * (p.y() - y_lo) / y_span,
                        p.label().clone(),
                    )
                }));
            }
            (true, false) => {
                let (x_span, y_span) = (self.x.lim.log_span(), self.y.lim.span());
                out.extend(points.iter().map(|p| {
                    Point::with_label(
                        x_len * (p.x() / x_lo).ln() / x_span,
                        y_len * (p.y() - y_lo) / y_span,
                        p.label().clone(),
                    )
                }));
            }
            (false, true) => {
                let (x_span, y_span) = (self.x.lim.span(), self.y.lim.log_span());
                out.extend(points.iter().map(|p| {
                    Point::with_label(
                        x_len * (p.x() - x_lo) / x_span,
                        y_len * (p.y() / y_lo).ln() / y_span,
                        p.label().clone(),
                    )
                }));
            }
            (true, true) => {
                let (x_span, y_span) = (self.x.lim.log_span(), self.y.lim.log_span());
                out.extend(points.iter().map(|p| {
                    Point::with_label(
                        x_len * (p.x() / x_lo).ln() / x_span,
                        y_len * (p.y() / y_lo).ln() / y_span,
                        p.label().clone(),
                    )
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-300)
    }

    #[test]
    fn linear_endpoints() {
        let dim = Size::new(200., 100.);
        let t = Transform::new(dim, Lim::new(-1., 1.), Lim::new(0., 10.), false, false);
        assert_eq!(t.to_plot(-1., 0.), kurbo::Point::new(0., 0.));
        assert_eq!(t.to_plot(1., 10.), kurbo::Point::new(200., -100.));
        assert_eq!(t.to_plot(0., 5.), kurbo::Point::new(100., -50.));
    }

    #[test]
    fn log_endpoints() {
        let dim = Size::new(300., 300.);
        let t = Transform::new(dim, Lim::new(1., 1000.), Lim::new(1., 1000.), true, true);
        let p = t.to_plot(10., 100.);
        assert!(close(p.x, 100.));
        assert!(close(p.y, -200.));
        assert!(!t.to_plot(0., 1.).x.is_finite());
        assert!(t.to_plot(-1., 1.).x.is_nan());
    }

    #[test]
    fn round_trip() {
        let dim = Size::new(450., 300.);
        for &(log, lo, hi) in &[
            (false, -3., 7.),
            (false, 7., -3.),
            (true, 0.01, 500.),
            (true, 500., 0.01),
        ] {
            let s = Scale::horizontal(dim, Lim::new(lo, hi), log);
            let v = Scale::vertical(dim, Lim::new(lo, hi), log);
            for i in 1..100 {
                let t = i as f64 / 100.;
                let value = if log {
                    (lo.ln() + t * (hi / lo).ln()).exp()
                } else {
                    lo + t * (hi - lo)
                };
                assert!(close(s.to_value(s.to_plot(value)), value), "{}", value);
                assert!(close(v.to_value(v.to_plot(value)), value), "{}", value);
            }
        }
    }

    #[test]
    fn batch_matches_single() {
        let dim = Size::new(100., 80.);
        let points: Vec<Point> = vec![
            Point::new(1., 2.),
            Point::with_label(5., 0.5, "a"),
            Point::new(-1., 3.),
            Point::new(f64::NAN, 3.),
        ];
        let mut out = vec![];
        for &(xl, yl) in &[(false, false), (true, false), (false, true), (true, true)] {
            let t = Transform::new(dim, Lim::new(0.5, 8.), Lim::new(0.25, 4.), xl, yl);
            t.to_plot_all(&points, &mut out);
            assert_eq!(out.len(), points.len());
            for (p, q) in points.iter().zip(&out) {
                let single = t.to_plot_point(p);
                assert_eq!(single.is_valid(), q.is_valid());
                if q.is_valid() {
                    assert_eq!(single, *q);
                }
            }
        }
        assert_eq!(&**out[1].label(), "a");
    }
}
