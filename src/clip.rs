//! Clipping plot-space geometry against the plotting box.
//!
//! Everything here works on `kurbo` points in plot space, where the box spans `[0, width]`
//! horizontally and `[-height, 0]` vertically. Points with a non-finite coordinate are *invalid* and
//! never produce geometry.
use piet::kurbo::{Point, Size};

/// The intersections of a segment with the border of the plotting box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Cuts {
    /// The segment does not cross the border (or is entirely inside).
    None,
    /// One end of the segment is inside the box: this is where the segment leaves it.
    One(Point),
    /// Both ends are outside: where the segment enters the box, then where it leaves it.
    ///
    /// The two cuts are equal when the segment only touches the border.
    Two(Point, Point),
}

impl Cuts {
    pub fn len(&self) -> usize {
        match self {
            Cuts::None => 0,
            Cuts::One(_) => 1,
            Cuts::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cuts::None)
    }

    /// The cuts in order.
    pub fn iter(&self) -> impl Iterator<Item = Point> {
        let (a, b) = match *self {
            Cuts::None => (None, None),
            Cuts::One(a) => (Some(a), None),
            Cuts::Two(a, b) => (Some(a), Some(b)),
        };
        a.into_iter().chain(b)
    }
}

/// What produced a vertex while tracing a shape.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Vertex {
    /// A point inside the box.
    Normal,
    /// A point outside, moved onto the nearest border.
    Projection,
    /// An intersection with the border.
    Cut,
}

/// Which segment produced a polygon vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
enum PolygonVertex {
    Inside,
    SingleCut,
    DoubleCut,
}

/// Up to 4 candidate cuts.
#[derive(Debug, Copy, Clone)]
struct CutBuf {
    pts: [Point; 4],
    len: usize,
}

impl CutBuf {
    fn new() -> Self {
        CutBuf {
            pts: [Point::ZERO; 4],
            len: 0,
        }
    }

    fn push(&mut self, p: Point) {
        self.pts[self.len] = p;
        self.len += 1;
    }

    fn as_slice(&self) -> &[Point] {
        &self.pts[..self.len]
    }

    fn retain(&mut self, mut keep: impl FnMut(Point) -> bool) {
        let mut counter = 0;
        for i in 0..self.len {
            let p = self.pts[i];
            if keep(p) {
                self.pts[counter] = p;
                counter += 1;
            }
        }
        self.len = counter;
    }

    /// Remove cuts that repeat an earlier cut, within `tolerance` on each axis.
    fn dedup(&mut self, tolerance: f64) {
        let mut counter = 0;
        for i in 0..self.len {
            let p = self.pts[i];
            let repeated = self.pts[..counter]
                .iter()
                .any(|q| near(*q, p, tolerance));
            if !repeated {
                self.pts[counter] = p;
                counter += 1;
            }
        }
        self.len = counter;
    }

    /// Remove cuts that coincide with `point`, within `tolerance` on each axis.
    fn remove_point(&mut self, point: Point, tolerance: f64) {
        self.retain(|p| !near(p, point, tolerance));
    }
}

#[inline]
fn near(a: Point, b: Point, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

#[inline]
fn dist_sq(a: Point, b: Point) -> f64 {
    (a - b).hypot2()
}

/// The plotting box of a given size, in plot space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlotBox {
    pub dim: Size,
}

impl PlotBox {
    pub fn new(dim: Size) -> Self {
        PlotBox { dim }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.dim.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.dim.height
    }

    /// Whether `p` is valid and lies inside the box (border included).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.is_finite()
            && p.x >= 0.
            && p.x <= self.dim.width
            && -p.y >= 0.
            && -p.y <= self.dim.height
    }

    /// Where the segment `p1 -> p2` crosses the border of the box.
    ///
    /// Returns [`Cuts::One`] when exactly one end is inside, and [`Cuts::None`] or [`Cuts::Two`]
    /// when both are outside (ordered from `p1`). Invalid ends, both ends inside, or both ends on
    /// the same outer side of the box give [`Cuts::None`].
    pub fn cuts(&self, p1: Point, p2: Point) -> Cuts {
        if !(p1.is_finite() && p2.is_finite()) {
            return Cuts::None;
        }
        let (w, h) = (self.dim.width, self.dim.height);
        let inside1 = self.contains(p1);
        let inside2 = self.contains(p2);

        let dont_cut = (inside1 && inside2)
            || (p1.x < 0. && p2.x < 0.)
            || (p1.x > w && p2.x > w)
            || (-p1.y < 0. && -p2.y < 0.)
            || (-p1.y > h && -p2.y > h);
        if dont_cut {
            return Cuts::None;
        }

        // candidate cuts with the 4 lines along the border
        let mut cuts = CutBuf::new();
        let delta = p2 - p1;
        if delta.x == 0. {
            cuts.push(Point::new(p1.x, 0.));
            cuts.push(Point::new(p1.x, -h));
        } else if delta.y == 0. {
            cuts.push(Point::new(0., p1.y));
            cuts.push(Point::new(w, p1.y));
        } else {
            // y = y_cut + slope * x
            let slope = delta.y / delta.x;
            let y_cut = p1.y - slope * p1.x;
            cuts.push(Point::new(-y_cut / slope, 0.));
            cuts.push(Point::new((-h - y_cut) / slope, -h));
            cuts.push(Point::new(0., y_cut));
            cuts.push(Point::new(w, y_cut + slope * w));
        }

        // keep the ones on the border, between the two points
        let (dx, dy) = (delta.x.abs(), delta.y.abs());
        cuts.retain(|c| {
            self.contains(c)
                && (c.x - p1.x).abs() <= dx
                && (c.y - p1.y).abs() <= dy
                && (c.x - p2.x).abs() <= dx
                && (c.y - p2.y).abs() <= dy
        });

        if inside1 || inside2 {
            let point_inside = if inside1 { p1 } else { p2 };
            if cuts.len > 1 {
                cuts.dedup(0.);
            }
            if cuts.len > 1 {
                cuts.remove_point(point_inside, 0.);
            }
            // rounding errors
            if cuts.len > 1 {
                cuts.dedup(0.001);
            }
            if cuts.len > 1 {
                cuts.remove_point(point_inside, 0.001);
            }
            match cuts.as_slice() {
                // the segment leaves the box where the inside point is
                [] => Cuts::One(point_inside),
                [c] => Cuts::One(*c),
                [c, ..] => {
                    log::warn!(
                        "segment {:?} -> {:?} crosses the box border {} times, expected once",
                        p1,
                        p2,
                        cuts.len
                    );
                    Cuts::One(*c)
                }
            }
        } else {
            if cuts.len > 2 {
                cuts.dedup(0.);
            }
            // rounding errors
            if cuts.len > 2 {
                cuts.dedup(0.001);
            }
            match cuts.as_slice() {
                [] => Cuts::None,
                [c] => Cuts::Two(*c, *c),
                [a, b, rest @ ..] => {
                    if !rest.is_empty() {
                        log::warn!(
                            "segment {:?} -> {:?} crosses the box border {} times, expected 0 or 2",
                            p1,
                            p2,
                            cuts.len
                        );
                    }
                    if dist_sq(*a, p1) > dist_sq(*b, p1) {
                        Cuts::Two(*b, *a)
                    } else {
                        Cuts::Two(*a, *b)
                    }
                }
            }
        }
    }

    /// The part of the segment `p1 -> p2` that lies inside the box, if any.
    pub fn clip_segment(&self, p1: Point, p2: Point) -> Option<(Point, Point)> {
        if !(p1.is_finite() && p2.is_finite()) {
            return None;
        }
        let inside1 = self.contains(p1);
        let inside2 = self.contains(p2);
        if inside1 && inside2 {
            return Some((p1, p2));
        }
        match self.cuts(p1, p2) {
            Cuts::One(c) if inside1 => Some((p1, c)),
            Cuts::One(c) if inside2 => Some((c, p2)),
            Cuts::Two(a, b) => Some((a, b)),
            _ => None,
        }
    }

    /// The outline of the area between the line through `points` and the horizontal line at
    /// `reference_y`, limited to the box.
    ///
    /// Points outside the box are projected onto the top or bottom border, and the reference line
    /// is clamped to the box.
    pub fn horizontal_shape(&self, points: &[Point], reference_y: f64) -> Vec<Point> {
        let (w, h) = (self.dim.width, self.dim.height);
        let n = points.len();
        let next_valid = |from: usize| (from..n).find(|&j| points[j].is_finite());

        let mut shape: Vec<(Point, Vertex)> = vec![];
        let mut first_idx = None;
        let mut last_idx = None;
        for (i, &p) in points.iter().enumerate() {
            if !p.is_finite() {
                continue;
            }
            let mut added = false;
            if self.contains(p) {
                shape.push((p, Vertex::Normal));
                added = true;
            } else if p.x >= 0. && p.x <= w {
                let y = if -p.y < 0. { 0. } else { -h };
                shape.push((Point::new(p.x, y), Vertex::Projection));
                added = true;
            }
            if let Some(next) = next_valid(i + 1) {
                for cut in self.cuts(p, points[next]).iter() {
                    shape.push((cut, Vertex::Cut));
                    added = true;
                }
            }
            if added {
                first_idx.get_or_insert(i);
                last_idx = Some(i);
            }
        }

        let (first_idx, last_idx, (mut start, start_kind), (mut end, _)) =
            match (first_idx, last_idx, shape.first(), shape.last()) {
                (Some(f), Some(l), Some(&s), Some(&e)) => (f, l, s, e),
                _ => return vec![],
            };
        let on_side = |x: f64| x == 0. || x == w;
        let side_of = |p: Point| if p.x < 0. { 0. } else { w };

        let mut start_extreme = false;
        if !on_side(start.x) {
            if start_kind == Vertex::Cut {
                start.x = side_of(points[first_idx]);
                start_extreme = true;
            } else if first_idx != 0 {
                if let Some(prev) = (0..first_idx).rev().find(|&j| points[j].is_finite()) {
                    start.x = side_of(points[prev]);
                    start_extreme = true;
                }
            }
        }

        let mut end_extreme = false;
        if !on_side(end.x) && last_idx != n - 1 {
            if let Some(next) = next_valid(last_idx + 1) {
                end.x = side_of(points[next]);
                end_extreme = true;
            }
        }

        let mut out: Vec<Point> = shape.into_iter().map(|(p, _)| p).collect();
        if end_extreme {
            out.push(end);
        }
        let reference_y = if -reference_y < 0. {
            0.
        } else if -reference_y > h {
            -h
        } else {
            reference_y
        };
        out.push(Point::new(end.x, reference_y));
        out.push(Point::new(start.x, reference_y));
        if start_extreme {
            out.push(start);
        }
        out
    }

    /// Like [`PlotBox::horizontal_shape`], but the area reaches a vertical line at `reference_x`.
    pub fn vertical_shape(&self, points: &[Point], reference_x: f64) -> Vec<Point> {
        // reflecting across the box diagonal turns this into the horizontal case
        let flip = |p: &Point| Point::new(-p.y, -p.x);
        let flipped_box = PlotBox::new(Size::new(self.dim.height, self.dim.width));
        let flipped: Vec<Point> = points.iter().map(flip).collect();
        flipped_box
            .horizontal_shape(&flipped, -reference_x)
            .iter()
            .map(flip)
            .collect()
    }

    /// The polygon through `points`, cropped to the box.
    ///
    /// Invalid points are dropped. When the polygon leaves the box across one edge and comes back
    /// across an adjacent edge, the corner between them is added. A polygon that surrounds the
    /// whole box without crossing it crops to the box itself. Returns no points when fewer than 3
    /// remain.
    pub fn crop_polygon(&self, points: &[Point]) -> Vec<Point> {
        let points: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
        let n = points.len();
        if n < 3 {
            return vec![];
        }

        let mut tmp: Vec<(Point, PolygonVertex)> = Vec::with_capacity(2 * n);
        for (i, &p) in points.iter().enumerate() {
            if self.contains(p) {
                tmp.push((p, PolygonVertex::Inside));
            }
            match self.cuts(p, points[(i + 1) % n]) {
                Cuts::None => (),
                Cuts::One(c) => tmp.push((c, PolygonVertex::SingleCut)),
                Cuts::Two(a, b) => {
                    tmp.push((a, PolygonVertex::DoubleCut));
                    tmp.push((b, PolygonVertex::DoubleCut));
                }
            }
        }

        if tmp.is_empty() {
            let center = Point::new(0.5 * self.dim.width, -0.5 * self.dim.height);
            return if encloses(&points, center) {
                self.corners().to_vec()
            } else {
                vec![]
            };
        }

        let mut cropped = Vec::with_capacity(tmp.len() + 4);
        for (i, &(p, kind)) in tmp.iter().enumerate() {
            cropped.push(p);
            let (next, next_kind) = tmp[(i + 1) % tmp.len()];
            let both_cuts = kind != PolygonVertex::Inside && next_kind != PolygonVertex::Inside;
            let any_single =
                kind == PolygonVertex::SingleCut || next_kind == PolygonVertex::SingleCut;
            if both_cuts && any_single {
                if let Some(corner) = self.corner_between(p, next) {
                    cropped.push(corner);
                }
            }
        }

        if cropped.len() > 2 {
            cropped
        } else {
            vec![]
        }
    }

    /// The corners, clockwise on screen from the bottom-left one.
    pub fn corners(&self) -> [Point; 4] {
        let (w, h) = (self.dim.width, self.dim.height);
        [
            Point::new(0., 0.),
            Point::new(0., -h),
            Point::new(w, -h),
            Point::new(w, 0.),
        ]
    }

    /// The box corner joining a point on a side edge and a point on the top or bottom edge.
    ///
    /// `None` unless one point is on a vertical edge only and the other on a horizontal edge only.
    fn corner_between(&self, a: Point, b: Point) -> Option<Point> {
        let (w, h) = (self.dim.width, self.dim.height);
        let on_vertical = |p: Point| p.x == 0. || p.x == w;
        let on_horizontal = |p: Point| p.y == 0. || p.y == -h;
        match (on_vertical(a), on_horizontal(a), on_vertical(b), on_horizontal(b)) {
            (true, false, false, true) => Some(Point::new(a.x, b.y)),
            (false, true, true, false) => Some(Point::new(b.x, a.y)),
            _ => None,
        }
    }
}

/// Even-odd test of `p` against the polygon through `points`.
fn encloses(points: &[Point], p: Point) -> bool {
    let mut inside = false;
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        if (a.y > p.y) != (b.y > p.y) && p.x < a.x + (b.x - a.x) * (p.y - a.y) / (b.y - a.y) {
            inside = !inside;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_box() -> PlotBox {
        PlotBox::new(Size::new(100., 50.))
    }

    fn close(a: Point, b: Point) -> bool {
        near(a, b, 1e-9)
    }

    #[test]
    fn one_end_inside() {
        let b = test_box();
        assert_eq!(
            b.cuts(Point::new(-10., -25.), Point::new(50., -25.)),
            Cuts::One(Point::new(0., -25.))
        );
        assert_eq!(
            b.cuts(Point::new(50., -25.), Point::new(150., -25.)),
            Cuts::One(Point::new(100., -25.))
        );
        // vertical segment leaving through the top
        assert_eq!(
            b.cuts(Point::new(30., -10.), Point::new(30., -80.)),
            Cuts::One(Point::new(30., -50.))
        );
    }

    #[test]
    fn both_ends_outside() {
        let b = test_box();
        let p1 = Point::new(-10., -60.);
        let cuts = b.cuts(p1, Point::new(110., 10.));
        match cuts {
            Cuts::Two(first, second) => {
                assert!(b.contains(first) && b.contains(second));
                assert!(dist_sq(first, p1) <= dist_sq(second, p1));
                assert!(close(first, Point::new(50. / 7., -50.)));
                assert!(close(second, Point::new(650. / 7., 0.)));
            }
            other => panic!("expected two cuts, got {:?}", other),
        }
        // the same segment walked backwards
        match b.cuts(Point::new(110., 10.), p1) {
            Cuts::Two(first, _) => assert!(close(first, Point::new(650. / 7., 0.))),
            other => panic!("expected two cuts, got {:?}", other),
        }
    }

    #[test]
    fn through_a_corner() {
        let b = test_box();
        // the two candidate cuts at (0, 0) collapse into one
        assert_eq!(
            b.cuts(Point::new(-10., 10.), Point::new(10., -10.)),
            Cuts::One(Point::new(0., 0.))
        );
    }

    #[test]
    fn no_cuts() {
        let b = test_box();
        // same side
        assert_eq!(b.cuts(Point::new(-1., -1.), Point::new(-5., -40.)), Cuts::None);
        assert_eq!(b.cuts(Point::new(10., 1.), Point::new(90., 5.)), Cuts::None);
        // inside
        assert_eq!(b.cuts(Point::new(10., -1.), Point::new(90., -5.)), Cuts::None);
        // invalid
        assert_eq!(b.cuts(Point::new(f64::NAN, -1.), Point::new(200., -5.)), Cuts::None);
        // misses the box
        assert_eq!(b.cuts(Point::new(-40., -20.), Point::new(20., 40.)), Cuts::None);
        assert!(Cuts::None.is_empty());
    }

    #[test]
    fn clipped_segments() {
        let b = test_box();
        let inside = (Point::new(10., -10.), Point::new(20., -20.));
        assert_eq!(b.clip_segment(inside.0, inside.1), Some(inside));
        assert_eq!(
            b.clip_segment(Point::new(50., -25.), Point::new(150., -25.)),
            Some((Point::new(50., -25.), Point::new(100., -25.)))
        );
        assert_eq!(
            b.clip_segment(Point::new(150., -25.), Point::new(50., -25.)),
            Some((Point::new(100., -25.), Point::new(50., -25.)))
        );
        assert_eq!(
            b.clip_segment(Point::new(-50., -25.), Point::new(150., -25.)),
            Some((Point::new(0., -25.), Point::new(100., -25.)))
        );
        assert_eq!(b.clip_segment(Point::new(-50., 5.), Point::new(150., 5.)), None);
    }

    #[test]
    fn horizontal_shape_between_sides() {
        let b = test_box();
        let points = [
            Point::new(-20., -25.),
            Point::new(50., -25.),
            Point::new(120., -25.),
        ];
        assert_eq!(
            b.horizontal_shape(&points, 0.),
            vec![
                Point::new(0., -25.),
                Point::new(50., -25.),
                Point::new(100., -25.),
                Point::new(100., 0.),
                Point::new(0., 0.),
            ]
        );
        // the reference is clamped to the box
        let shape = b.horizontal_shape(&points, -300.);
        assert_eq!(shape[3], Point::new(100., -50.));
    }

    #[test]
    fn horizontal_shape_extreme_start() {
        let b = test_box();
        let shape = b.horizontal_shape(&[Point::new(-20., 20.), Point::new(50., -25.)], 0.);
        assert_eq!(shape.len(), 5);
        assert_eq!(shape[0].y, 0.);
        assert_eq!(shape[1], Point::new(50., -25.));
        assert_eq!(shape[2], Point::new(50., 0.));
        assert_eq!(shape[3], Point::new(0., 0.));
        // the start is moved onto the left edge, on the side of the point it came from
        assert_eq!(shape[4], Point::new(0., 0.));
    }

    #[test]
    fn shapes_skip_invalid_points() {
        let b = test_box();
        assert!(b.horizontal_shape(&[], 0.).is_empty());
        assert!(b
            .horizontal_shape(&[Point::new(f64::NAN, 1.), Point::new(-5., -5.)], 0.)
            .is_empty());
        let with_gap = b.horizontal_shape(
            &[
                Point::new(10., -10.),
                Point::new(f64::NAN, 0.),
                Point::new(20., -10.),
            ],
            0.,
        );
        assert_eq!(&with_gap[..2], &[Point::new(10., -10.), Point::new(20., -10.)]);
    }

    #[test]
    fn vertical_shape() {
        let b = test_box();
        let points = [
            Point::new(50., 10.),
            Point::new(50., -25.),
            Point::new(50., -60.),
        ];
        assert_eq!(
            b.vertical_shape(&points, 0.),
            vec![
                Point::new(50., 0.),
                Point::new(50., -25.),
                Point::new(50., -50.),
                Point::new(0., -50.),
                Point::new(0., 0.),
            ]
        );
    }

    /// A triangle with one vertex inside near `corner` and the other two outside across the two
    /// edges meeting there.
    fn corner_triangle(corner: Point) -> (Point, Point, Point) {
        let ix = if corner.x == 0. { 1. } else { -1. };
        let iy = if corner.y == 0. { -1. } else { 1. };
        let p = Point::new(corner.x + 20. * ix, corner.y + 20. * iy);
        let a = Point::new(corner.x - 40. * ix, p.y);
        let b = Point::new(p.x, corner.y - 40. * iy);
        (p, a, b)
    }

    #[test]
    fn polygon_corners() {
        let b = test_box();
        for &corner in &[
            Point::new(0., 0.),
            Point::new(0., -50.),
            Point::new(100., -50.),
            Point::new(100., 0.),
        ] {
            let (p, across_side, across_top_bottom) = corner_triangle(corner);
            let on_side = Point::new(corner.x, p.y);
            let on_top_bottom = Point::new(p.x, corner.y);

            assert_eq!(
                b.crop_polygon(&[p, across_side, across_top_bottom]),
                vec![p, on_side, corner, on_top_bottom],
                "corner {:?}",
                corner
            );
            // the other way round
            assert_eq!(
                b.crop_polygon(&[p, across_top_bottom, across_side]),
                vec![p, on_top_bottom, corner, on_side],
                "corner {:?}",
                corner
            );
        }
    }

    #[test]
    fn polygon_across_opposite_edges() {
        let b = test_box();
        let strip = [
            Point::new(-10., -20.),
            Point::new(110., -20.),
            Point::new(110., -30.),
            Point::new(-10., -30.),
        ];
        assert_eq!(
            b.crop_polygon(&strip),
            vec![
                Point::new(0., -20.),
                Point::new(100., -20.),
                Point::new(100., -30.),
                Point::new(0., -30.),
            ]
        );
    }

    #[test]
    fn polygon_inside_and_degenerate() {
        let b = test_box();
        let triangle = [
            Point::new(10., -10.),
            Point::new(20., -10.),
            Point::new(15., -20.),
        ];
        assert_eq!(b.crop_polygon(&triangle), triangle.to_vec());
        assert!(b.crop_polygon(&triangle[..2]).is_empty());
        let with_invalid = [triangle[0], Point::new(f64::NAN, 0.), triangle[1]];
        assert!(b.crop_polygon(&with_invalid).is_empty());
    }

    #[test]
    fn polygon_around_the_box() {
        let b = test_box();
        let around = [
            Point::new(-50., 40.),
            Point::new(200., 40.),
            Point::new(200., -150.),
            Point::new(-50., -150.),
        ];
        assert_eq!(b.crop_polygon(&around), b.corners().to_vec());
        // beside the box, not around it
        let beside = [
            Point::new(150., 10.),
            Point::new(300., 10.),
            Point::new(220., -80.),
        ];
        assert!(b.crop_polygon(&beside).is_empty());
    }
}
