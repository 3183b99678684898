use crate::ArcStr;
use piet::kurbo;
use std::fmt;

/// A labelled `(x, y)` pair.
///
/// The same type is used for data values and for their plot-space images. A point is *valid* when
/// both coordinates are finite; invalid points are carried along but never drawn or used to fit
/// limits.
#[derive(Clone, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
    label: ArcStr,
    valid: bool,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "({}, {})", self.x, self.y)
        } else {
            write!(f, "({}, {}, {:?})", self.x, self.y, &*self.label)
        }
    }
}

impl Point {
    /// A point with an empty label.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_label(x, y, "")
    }

    pub fn with_label(x: f64, y: f64, label: impl Into<ArcStr>) -> Self {
        Point {
            x,
            y,
            label: label.into(),
            valid: x.is_finite() && y.is_finite(),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn label(&self) -> &ArcStr {
        &self.label
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The coordinates as a kurbo point, dropping the label.
    #[inline]
    pub fn pos(&self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
        self.update_valid();
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.update_valid();
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.update_valid();
    }

    pub fn set_label(&mut self, label: impl Into<ArcStr>) {
        self.label = label.into();
    }

    /// Replace coordinates and label together.
    pub fn set(&mut self, x: f64, y: f64, label: impl Into<ArcStr>) {
        self.set_xy(x, y);
        self.set_label(label);
    }

    fn update_valid(&mut self) {
        self.valid = self.x.is_finite() && self.y.is_finite();
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl<L: Into<ArcStr>> From<(f64, f64, L)> for Point {
    fn from((x, y, label): (f64, f64, L)) -> Self {
        Point::with_label(x, y, label)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<kurbo::Vec2> for Point {
    fn from(v: kurbo::Vec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<&Point> for kurbo::Point {
    fn from(p: &Point) -> Self {
        p.pos()
    }
}
