//! Time series values and free-form text parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of hourly samples in a full day profile.
pub const HOURS: usize = 24;

/// Ordered, non-empty sequence of hourly samples.
///
/// The hour index is implicit by position. Construction always goes through
/// [`TimeSeries::new`], [`parse_series`], or a preset, so an empty sequence
/// can never be observed: it collapses to `[0]`.
///
/// # Examples
///
/// ```
/// use der_microgrid::profile::TimeSeries;
///
/// let s = TimeSeries::new(Vec::new());
/// assert_eq!(s.values(), &[0.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Wraps `values`, substituting `[0]` when it is empty.
    pub fn new(values: Vec<f64>) -> Self {
        if values.is_empty() {
            Self(vec![0.0])
        } else {
            Self(values)
        }
    }

    /// Builds a 24-sample series from a per-hour function.
    pub fn from_fn(f: impl FnMut(usize) -> f64) -> Self {
        Self((0..HOURS).map(f).collect())
    }

    /// Samples in hour order.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of samples (never zero).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the series covers exactly one day of hourly samples.
    pub fn is_full_day(&self) -> bool {
        self.0.len() == HOURS
    }

    /// Renders the series the way the profile text box shows it: `"a, b, c"`.
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<TimeSeries> for Vec<f64> {
    fn from(series: TimeSeries) -> Self {
        series.0
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Parses comma-separated text into a series.
///
/// Each token is trimmed and coerced with [`coerce_number`]. Tokens that do
/// not coerce are dropped, never replaced. When nothing survives the result
/// is `[0]`. Never fails.
///
/// # Examples
///
/// ```
/// use der_microgrid::profile::parse_series;
///
/// assert_eq!(parse_series("1, a, 3").values(), &[1.0, 3.0]);
/// assert_eq!(parse_series("x, y").values(), &[0.0]);
/// ```
pub fn parse_series(text: &str) -> TimeSeries {
    let values = text.split(',').filter_map(coerce_number).collect();
    TimeSeries::new(values)
}

/// Coerces one token to a number, or `None` if it is not numeric.
///
/// Rules:
/// - empty or all-whitespace tokens coerce to `0`
/// - decimal literals with optional sign, fraction, and exponent
/// - unsigned `0x`, `0o`, `0b` integer literals
/// - `Infinity` with optional sign
///
/// Anything else (including `NaN`, `inf`, and trailing garbage) is rejected.
pub fn coerce_number(token: &str) -> Option<f64> {
    let t = token.trim();
    if t.is_empty() {
        return Some(0.0);
    }

    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(radix_value) = parse_radix_literal(t) {
        return radix_value;
    }

    if !is_decimal_literal(t) {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Returns `Some(result)` if `t` carries a radix prefix, `None` otherwise.
fn parse_radix_literal(t: &str) -> Option<Option<f64>> {
    let (radix, digits) = match t.get(..2)? {
        "0x" | "0X" => (16, &t[2..]),
        "0o" | "0O" => (8, &t[2..]),
        "0b" | "0B" => (2, &t[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return Some(None);
    }
    // Folded into f64 so literals wider than any integer type stay finite.
    Some(digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    }))
}

/// Accepts `[+-]digits[.digits][(e|E)[+-]digits]` with at least one mantissa digit.
fn is_decimal_literal(t: &str) -> bool {
    let bytes = t.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut mantissa_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
