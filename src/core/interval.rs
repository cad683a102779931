//! Confidence band construction and clamping.
//!
//! The clamping rules are a heuristic, not prediction-interval theory:
//! bounds never go below zero, and a lower bound that hugs the point
//! forecast (above 90% of it) is pushed down to half the forecast. This
//! is a known approximation kept for output stability.

use crate::core::Forecast;
use crate::utils::stats::{mean, std_dev};

/// Minimum band half-width as a fraction of the point forecast.
pub const MIN_RELATIVE_MARGIN: f64 = 0.15;

/// Band half-width as a multiple of the effective standard deviation.
pub const STDEV_MARGIN_MULTIPLIER: f64 = 1.5;

/// A lower bound above this fraction of the forecast is considered degenerate.
pub const LOWER_COLLAPSE_FRACTION: f64 = 0.9;

/// Replacement lower bound (fraction of the forecast) for a degenerate band.
pub const LOWER_RESET_FRACTION: f64 = 0.5;

/// Standard deviation used for heuristic bands.
///
/// The sample stdev of `history`, or 10% of its mean when the stdev is
/// below 1% of the mean (near-constant input would otherwise give a
/// zero-width band).
pub fn effective_std_dev(history: &[f64]) -> f64 {
    let m = mean(history);
    if !m.is_finite() {
        return 0.0;
    }
    let s = std_dev(history);
    if !s.is_finite() || s < 0.01 * m.abs() {
        0.1 * m.abs()
    } else {
        s
    }
}

/// Clamp one `(lower, value, upper)` triple.
///
/// Guarantees `0 <= lower <= value <= upper`.
pub fn clamp_bounds(value: f64, lower: f64, upper: f64) -> (f64, f64, f64) {
    let value = value.max(0.0);
    let mut lower = lower.max(0.0);
    if lower > LOWER_COLLAPSE_FRACTION * value {
        lower = LOWER_RESET_FRACTION * value;
    }
    let lower = lower.min(value);
    let upper = if upper.is_finite() { upper.max(value) } else { value };
    (value, lower, upper)
}

/// Heuristic band: `value ± max(0.15 * value, 1.5 * effective_stdev)`.
pub fn heuristic_bounds(values: &[f64], effective_std: f64) -> (Vec<f64>, Vec<f64>) {
    let mut lower = Vec::with_capacity(values.len());
    let mut upper = Vec::with_capacity(values.len());
    for &v in values {
        let margin = (MIN_RELATIVE_MARGIN * v).max(STDEV_MARGIN_MULTIPLIER * effective_std);
        let (_, lo, hi) = clamp_bounds(v, v - margin, v + margin);
        lower.push(lo);
        upper.push(hi);
    }
    (lower, upper)
}

/// Attach heuristic bands to a point forecast.
pub fn with_heuristic_bounds(forecast: Forecast, effective_std: f64) -> Forecast {
    let forecast = forecast.clamp_non_negative();
    let (lower, upper) = heuristic_bounds(forecast.values(), effective_std);
    forecast.with_intervals(lower, upper)
}

/// Clamp native model bands; falls back to heuristic bands if any bound is
/// missing or non-finite.
pub fn sanitize(forecast: Forecast, effective_std: f64) -> Forecast {
    let usable = match (forecast.lower(), forecast.upper()) {
        (Some(lo), Some(hi)) => {
            lo.len() == forecast.horizon()
                && hi.len() == forecast.horizon()
                && lo.iter().chain(hi.iter()).all(|v| v.is_finite())
        }
        _ => false,
    };
    if !usable {
        return with_heuristic_bounds(forecast.without_intervals(), effective_std);
    }

    let (values, lower, upper) = forecast.into_parts();
    let lower = lower.unwrap_or_default();
    let upper = upper.unwrap_or_default();
    let mut out_values = Vec::with_capacity(values.len());
    let mut out_lower = Vec::with_capacity(values.len());
    let mut out_upper = Vec::with_capacity(values.len());
    for ((v, lo), hi) in values.into_iter().zip(lower).zip(upper) {
        let (v, lo, hi) = clamp_bounds(v, lo, hi);
        out_values.push(v);
        out_lower.push(lo);
        out_upper.push(hi);
    }
    Forecast::from_values_with_intervals(out_values, out_lower, out_upper)
}
