use std::fmt;

/// The limits of an axis, `[lo, hi]`.
///
/// Unlike a mathematical interval the ends are ordered by position, not value: `lo > hi` is allowed
/// and means the axis is drawn inverted.
///
/// Maintains invariants: `-∞ < lo, hi < ∞` and `lo != hi`.
#[derive(Copy, Clone, PartialEq)]
pub struct Lim {
    lo: f64,
    hi: f64,
}

impl fmt::Debug for Lim {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

impl Default for Lim {
    fn default() -> Self {
        Lim { lo: 0., hi: 1. }
    }
}

impl Lim {
    /// The limits substituted when a log scale is asked to show non-positive values.
    pub const LOG_DEFAULT: Lim = Lim { lo: 0.1, hi: 10. };

    /// Construct limits from the value at the start and at the end of the axis.
    ///
    /// # Panics
    ///
    /// This function will panic unless both ends are finite and different. Use [`Lim::try_new`], or
    /// `TryFrom<(f64, f64)>`, for untrusted input.
    #[inline]
    pub fn new(lo: f64, hi: f64) -> Self {
        match Lim::try_new(lo, hi) {
            Some(lim) => lim,
            None => panic!("invalid limits: need -∞ < {}, {} < ∞ and {} != {}", lo, hi, lo, hi),
        }
    }

    /// Returns `None` unless both ends are finite and different.
    #[inline]
    pub fn try_new(lo: f64, hi: f64) -> Option<Self> {
        if lo.is_finite() && hi.is_finite() && lo != hi {
            Some(Lim { lo, hi })
        } else {
            None
        }
    }

    /// `(0.1, 10)`, or `(10, 0.1)` when `inverted`.
    #[inline]
    pub fn log_default(inverted: bool) -> Self {
        Lim::LOG_DEFAULT.oriented(inverted)
    }

    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    #[inline]
    pub fn as_tuple(self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.lo.min(self.hi)
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.lo.max(self.hi)
    }

    /// `hi - lo`. Negative for inverted limits.
    #[inline]
    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// `ln(hi / lo)`, the span in log space.
    #[inline]
    pub fn log_span(&self) -> f64 {
        (self.hi / self.lo).ln()
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.lo > self.hi
    }

    /// Whether these limits can be shown on a logarithmic axis.
    #[inline]
    pub fn is_log_compatible(&self) -> bool {
        self.lo > 0. && self.hi > 0.
    }

    /// Replace limits that cannot be shown on a log axis by [`Lim::LOG_DEFAULT`], keeping the
    /// orientation.
    pub fn or_log_default(self) -> Self {
        if self.is_log_compatible() {
            self
        } else {
            log::warn!("limits {:?} are not valid on a log scale, using (0.1, 10)", self);
            Lim::log_default(self.is_inverted())
        }
    }

    /// Swap the ends.
    #[inline]
    pub fn reversed(self) -> Self {
        Lim {
            lo: self.hi,
            hi: self.lo,
        }
    }

    /// The same values, ordered so that `is_inverted() == inverted`.
    #[inline]
    pub fn oriented(self, inverted: bool) -> Self {
        if self.is_inverted() == inverted {
            self
        } else {
            self.reversed()
        }
    }

    /// Whether `val` lies between the two ends (inclusive), whatever their order.
    #[inline]
    pub fn contains(&self, val: f64) -> bool {
        val >= self.min() && val <= self.max()
    }
}

/// Ends that do not make valid limits: equal, or not finite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InvalidLim {
    pub lo: f64,
    pub hi: f64,
}

impl fmt::Display for InvalidLim {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid limits {}..{}", self.lo, self.hi)
    }
}

impl std::error::Error for InvalidLim {}

/// Convert limits handed to a setter, warning about invalid ones.
pub(crate) fn accepted<L>(lim: L) -> Option<Lim>
where
    L: TryInto<Lim>,
    L::Error: fmt::Display,
{
    match lim.try_into() {
        Ok(lim) => Some(lim),
        Err(e) => {
            log::warn!("ignoring {}", e);
            None
        }
    }
}

impl TryFrom<(f64, f64)> for Lim {
    type Error = InvalidLim;

    fn try_from((lo, hi): (f64, f64)) -> Result<Self, Self::Error> {
        Lim::try_new(lo, hi).ok_or(InvalidLim { lo, hi })
    }
}

impl From<Lim> for (f64, f64) {
    fn from(lim: Lim) -> Self {
        lim.as_tuple()
    }
}
