//! Choosing where the ticks of an axis go, and what they say.
//!
//! Linear ticks are placed on a step rounded to as few significant digits as possible, and the
//! number of decimals needed to print that step (the *precision*) is kept alongside the values so
//! that labels come out as `0.25, 0.50, 0.75` rather than `0.25, 0.5, 0.75`. Logarithmic ticks are
//! always the 9 multiples of each decade, with labels on the powers of ten only.
use crate::{scale::Scale, ArcStr, Lim};

/// Past this many ticks, [`move_linear_ticks`] gives up on keeping the phase and the ticks are
/// regenerated from scratch.
const MAX_MOVED_TICKS: usize = 10_000;
/// How many extra digits we try before giving up on making a step round trip.
const MAX_EXTRA_DIGITS: i32 = 20;
/// How many steps we walk looking for the first tick inside the limits.
const MAX_FIRST_TICK_STEPS: usize = 16;

/// How the ticks of an axis are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum TickSpec {
    /// Roughly this many intervals between ticks (`0` means no ticks). Ignored on log axes.
    Count(usize),
    /// Exactly this distance between ticks. Ignored on log axes.
    Separation(f64),
    /// These values, whatever the limits. Pins the ticks.
    Explicit(Vec<f64>),
}

impl Default for TickSpec {
    fn default() -> Self {
        TickSpec::Count(5)
    }
}

/// A position on an axis that we can mark and label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// The data value at the tick.
    pub value: f64,
    /// The distance along the axis that the tick should be displayed, in plot space.
    pub pos: f64,
    /// Whether `pos` falls within the plotting box.
    pub inside: bool,
    /// The label that should be displayed. Empty for minor log ticks.
    pub label: ArcStr,
}

/// Tick values, plus the number of decimals used to compute them (if any).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickSet {
    pub values: Vec<f64>,
    pub precision: Option<i32>,
}

/// Round half up, the way javascript's `Math.round` does (`-2.5 -> -2`).
#[inline]
pub fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.
    } else {
        floor
    }
}

/// The number of decimals that roughly resolves `n`: `round(-log10(|n| / 2))`.
///
/// This is negative for large numbers (`sig_digits(2000.) == -3`).
#[inline]
pub fn sig_digits(n: f64) -> i32 {
    round_half_up(-(0.5 * n.abs()).log10()) as i32
}

/// Round `n` to `digits` decimals. `digits` may be negative to round to tens, hundreds, ...
#[inline]
pub fn round_plus(n: f64, digits: i32) -> f64 {
    let scale = 10f64.powf(digits as f64);
    let rounded = round_half_up(n * scale) / scale;
    if digits <= 0 {
        round_half_up(rounded)
    } else {
        rounded
    }
}

/// The smallest precision, starting from the significant digits of `step`, at which `step` survives
/// rounding unchanged.
fn exact_precision(step: f64) -> i32 {
    let start = sig_digits(step);
    let mut digits = start;
    while round_plus(step, digits) != step {
        if digits - start >= MAX_EXTRA_DIGITS {
            log::warn!("tick step {} cannot be rounded exactly", step);
            break;
        }
        digits += 1;
    }
    digits
}

/// Round `raw` to its significant digits, adding one more digit if that rounds it to nothing or
/// to more than the whole `span`.
fn rounded_step(raw: f64, span: f64) -> (f64, i32) {
    let mut digits = sig_digits(raw);
    let mut step = round_plus(raw, digits);
    if step == 0. || step.abs() > span.abs() {
        digits += 1;
        step = round_plus(raw, digits);
    }
    (step, digits)
}

/// Whether `value` lies outside both ends of `lim` (strictly).
#[inline]
fn outside(lim: Lim, value: f64) -> bool {
    (lim.hi() - value) * (lim.lo() - value) > 0.
}

/// Walk forward from `first` in steps of `step` while the next value still lies within `lim`.
fn walk(lim: Lim, first: f64, step: f64, digits: i32) -> Vec<f64> {
    let n = ((lim.hi() - first) / step).abs().floor() as usize + 1;
    let mut values = Vec::with_capacity(n);
    values.push(first);
    let mut prev = first;
    for _ in 1..n {
        prev = round_plus(prev + step, digits);
        values.push(prev);
    }
    values
}

/// Compute the tick values for the given limits.
pub fn compute_ticks(lim: Lim, log: bool, spec: &TickSpec) -> TickSet {
    match spec {
        TickSpec::Explicit(values) => TickSet {
            values: values.clone(),
            precision: None,
        },
        _ if log => log_ticks(lim),
        spec => linear_ticks(lim, spec),
    }
}

/// The 9 multiples of every decade covering `lim`, plus the closing power of ten.
///
/// Values run in the same direction as `lim`. Returns no ticks for limits that are not positive.
pub fn log_ticks(lim: Lim) -> TickSet {
    if !lim.is_log_compatible() {
        log::warn!("cannot compute log ticks for limits {:?}", lim);
        return TickSet::default();
    }
    let first_exp = lim.min().log10().floor() as i32;
    let last_exp = lim.max().log10().ceil() as i32;

    let n = (last_exp - first_exp).max(0) as usize * 9 + 1;
    let mut values = Vec::with_capacity(n);
    for exp in first_exp..last_exp {
        let base = round_plus(10f64.powf(exp as f64), -exp);
        values.extend((1..=9).map(|mult| mult as f64 * base));
    }
    values.push(round_plus(10f64.powf(last_exp as f64), -last_exp));

    if lim.is_inverted() {
        values.reverse();
    }
    TickSet {
        values,
        precision: None,
    }
}

/// Ticks on a rounded step, roughly centered within `lim`.
///
/// # Panics
///
/// Panics if `spec` is [`TickSpec::Explicit`].
pub fn linear_ticks(lim: Lim, spec: &TickSpec) -> TickSet {
    let span = lim.span();
    let (step, digits) = match *spec {
        TickSpec::Count(0) => return TickSet::default(),
        TickSpec::Count(n) => rounded_step(span / n as f64, span),
        TickSpec::Separation(sep) => {
            let step = if lim.is_inverted() { -sep } else { sep };
            (step, exact_precision(step))
        }
        TickSpec::Explicit(_) => panic!("explicit ticks are not computed"),
    };

    let n_steps = (span / step).floor();
    if !(n_steps > 0.) {
        return TickSet::default();
    }

    let first = lim.lo() + (span - n_steps * step) / 2.;
    // start a couple of steps early, then step up to the first one inside
    let mut first = round_plus(first - 2. * step, digits);
    let mut steps = 0;
    while outside(lim, first) {
        if steps == MAX_FIRST_TICK_STEPS {
            log::warn!("step {} is too small for limits {:?}", step, lim);
            return TickSet::default();
        }
        first = round_plus(first + step, digits);
        steps += 1;
    }

    TickSet {
        values: walk(lim, first, step, digits),
        precision: Some(digits),
    }
}

/// Recompute linear ticks for new limits, keeping the step and phase of `prev`.
///
/// Ticks stay on the same grid while the limits are dragged around, instead of being re-centered
/// every time. Returns `None` when there is nothing to keep (no previous ticks, or so many new ticks
/// that they should be regenerated).
pub fn move_linear_ticks(prev: &[f64], lim: Lim, spec: &TickSpec) -> Option<TickSet> {
    let &t0 = prev.first()?;
    let span = lim.span();
    let (step, digits) = match *spec {
        TickSpec::Separation(sep) => {
            let step = if lim.is_inverted() { -sep } else { sep };
            (step, exact_precision(step))
        }
        _ => {
            let raw = match prev.get(1) {
                Some(&t1) => t1 - t0,
                None => span,
            };
            let (step, digits) = rounded_step(raw, span);
            (step.abs().copysign(span), digits)
        }
    };
    if !step.is_finite() || step == 0. {
        return None;
    }

    let mut first = round_plus(t0 + step * ((lim.lo() - t0) / step).ceil(), digits);
    if outside(lim, first) {
        first = round_plus(t0 + step * ((lim.lo() - t0) / step).floor(), digits);
    }

    let n = ((lim.hi() - first) / step).abs().floor();
    if !(n < MAX_MOVED_TICKS as f64) {
        return None;
    }
    Some(TickSet {
        values: walk(lim, first, step, digits),
        precision: Some(digits),
    })
}

/// The plot-space positions of `values` along `scale`.
pub fn plot_ticks(values: &[f64], scale: &Scale) -> Vec<f64> {
    values.iter().map(|&v| scale.to_plot(v)).collect()
}

/// Format a tick value.
///
/// Log ticks are only labelled at powers of ten. Linear ticks print integers without decimals and
/// everything else at `precision` decimals (or in full when there is no precision).
pub fn tick_label(value: f64, log: bool, precision: Option<i32>, exp_labels: bool) -> ArcStr {
    if log {
        if !(value > 0.) {
            return "".into();
        }
        let log_value = value.log10();
        let exp = round_half_up(log_value);
        if (log_value - exp).abs() >= 1e-4 {
            return "".into();
        }
        if !exp_labels && exp > -3.1 && exp < 3.1 {
            if exp >= 0. {
                format_integer(round_half_up(value)).into()
            } else {
                format!("{}", value).into()
            }
        } else {
            format!("1e{}", exp as i32).into()
        }
    } else if value % 1. == 0. {
        format_integer(value).into()
    } else {
        match precision {
            Some(digits) if digits >= 0 => format!("{:.*}", digits as usize, value).into(),
            _ => format!("{}", value).into(),
        }
    }
}

/// Labels for a whole tick set.
pub fn tick_labels(set: &TickSet, log: bool, exp_labels: bool) -> Vec<ArcStr> {
    set.values
        .iter()
        .map(|&v| tick_label(v, log, set.precision, exp_labels))
        .collect()
}

fn format_integer(value: f64) -> String {
    if value == 0. {
        // no "-0"
        "0".into()
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(set: &TickSet, log: bool) -> Vec<String> {
        tick_labels(set, log, false)
            .iter()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn js_rounding() {
        assert_eq!(round_half_up(2.5), 3.);
        assert_eq!(round_half_up(-2.5), -2.);
        assert_eq!(round_half_up(-2.6), -3.);
        assert_eq!(round_plus(0.123456, 2), 0.12);
        assert_eq!(round_plus(1234., -2), 1200.);
        assert_eq!(round_plus(0.25, 1), 0.3);
        assert_eq!(sig_digits(0.2), 1);
        assert_eq!(sig_digits(2.), 0);
        assert_eq!(sig_digits(2000.), -3);
    }

    #[test]
    fn count_ticks() {
        let set = linear_ticks(Lim::new(0., 1.), &TickSpec::Count(5));
        assert_eq!(set.values, vec![0., 0.2, 0.4, 0.6, 0.8, 1.]);
        assert_eq!(set.precision, Some(1));
        assert_eq!(labels(&set, false), ["0", "0.2", "0.4", "0.6", "0.8", "1"]);

        let set = linear_ticks(Lim::new(0., 10.), &TickSpec::Count(5));
        assert_eq!(set.values, vec![0., 2., 4., 6., 8., 10.]);
        assert_eq!(labels(&set, false), ["0", "2", "4", "6", "8", "10"]);
    }

    #[test]
    fn inverted_ticks_decrease() {
        let set = linear_ticks(Lim::new(10., 0.), &TickSpec::Count(5));
        assert_eq!(set.values, vec![10., 8., 6., 4., 2., 0.]);
    }

    #[test]
    fn separation_ticks() {
        let set = linear_ticks(Lim::new(0., 1.), &TickSpec::Separation(0.25));
        assert_eq!(set.values, vec![0., 0.25, 0.5, 0.75, 1.]);
        assert_eq!(set.precision, Some(2));
        // the step round trips at the chosen precision
        assert_eq!(round_plus(0.25, 2), 0.25);
        assert_eq!(labels(&set, false), ["0", "0.25", "0.50", "0.75", "1"]);
    }

    #[test]
    fn no_ticks() {
        assert!(linear_ticks(Lim::new(0., 1.), &TickSpec::Count(0))
            .values
            .is_empty());
        // separation wider than the limits
        assert!(linear_ticks(Lim::new(0., 1.), &TickSpec::Separation(5.))
            .values
            .is_empty());
    }

    #[test]
    fn log_decades() {
        let set = log_ticks(Lim::new(1., 1000.));
        let mut expected = vec![];
        for base in &[1., 10., 100.] {
            for mult in 1..=9 {
                expected.push(mult as f64 * base);
            }
        }
        expected.push(1000.);
        assert_eq!(set.values, expected);

        let labels = labels(&set, true);
        let label_of = |v: f64| &labels[set.values.iter().position(|&t| t == v).unwrap()];
        assert_eq!(label_of(1.), "1");
        assert_eq!(label_of(10.), "10");
        assert_eq!(label_of(100.), "100");
        assert_eq!(label_of(1000.), "1000");
        assert_eq!(label_of(500.), "");
        assert_eq!(label_of(20.), "");

        let reversed = log_ticks(Lim::new(1000., 1.));
        assert_eq!(reversed.values.first(), Some(&1000.));
        assert_eq!(reversed.values.last(), Some(&1.));
    }

    #[test]
    fn log_labels() {
        assert_eq!(&*tick_label(100., true, None, true), "1e2");
        assert_eq!(&*tick_label(0.001, true, None, false), "0.001");
        assert_eq!(&*tick_label(1e-5, true, None, false), "1e-5");
        assert_eq!(&*tick_label(1e4, true, None, false), "1e4");
        assert_eq!(&*tick_label(0., true, None, false), "");
    }

    #[test]
    fn pinned_labels_print_raw() {
        let set = compute_ticks(Lim::new(0., 1.), false, &TickSpec::Explicit(vec![0.5, 0.125]));
        assert_eq!(set.precision, None);
        assert_eq!(labels(&set, false), ["0.5", "0.125"]);
    }

    #[test]
    fn regeneration_is_idempotent() {
        for &(lo, hi) in &[(0., 1.), (-3.3, 7.1), (1e6, 1e6 + 3.), (5., -5.)] {
            let lim = Lim::new(lo, hi);
            for spec in &[TickSpec::Count(5), TickSpec::Count(7), TickSpec::Separation(0.5)] {
                let a = compute_ticks(lim, false, spec);
                let b = compute_ticks(lim, false, spec);
                assert_eq!(a, b);
                assert_eq!(tick_labels(&a, false, false), tick_labels(&b, false, false));
            }
        }
    }

    #[test]
    fn moving_keeps_phase() {
        let spec = TickSpec::Count(5);
        let set = linear_ticks(Lim::new(0., 10.), &spec);
        let moved = move_linear_ticks(&set.values, Lim::new(1., 11.), &spec).unwrap();
        assert_eq!(moved.values, vec![2., 4., 6., 8., 10.]);
        assert_eq!(moved.precision, set.precision);

        let moved = move_linear_ticks(&moved.values, Lim::new(-3.5, 6.5), &spec).unwrap();
        assert_eq!(moved.values, vec![-2., 0., 2., 4., 6.]);

        assert!(move_linear_ticks(&[], Lim::new(0., 1.), &spec).is_none());
    }
}
