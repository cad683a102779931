//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal quantile for a confidence `level`.
///
/// # Example
/// ```
/// use demand_forecast::utils::stats::z_score;
///
/// // 95% confidence level -> z ≈ 1.96
/// let z = z_score(0.95);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn z_score(level: f64) -> f64 {
    let level = if level.is_finite() {
        level.clamp(0.5, 0.999)
    } else {
        0.95
    };
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf((1.0 + level) / 2.0),
        Err(_) => 1.96,
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Least-squares slope of `values` against their index.
///
/// Returns 0 for fewer than two points.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_x2: f64 = (0..n).map(|i| (i * i) as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();

    let denom = nf * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return 0.0;
    }
    (nf * sum_xy - sum_x * sum_y) / denom
}
