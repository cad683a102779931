//! Accuracy metrics for forecast evaluation.

use serde::{Deserialize, Serialize};

/// Held-out accuracy of a model's predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Absolute Percentage Error over non-zero actuals, in percent.
    /// `None` when every actual value is zero.
    pub mape: Option<f64>,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// `clamp(1 - mae / mean(actual), 0, 1)`, or 0 when the mean is not positive.
    pub accuracy: f64,
}

impl EvaluationMetrics {
    /// Metrics for a model that could not be scored against held-out data;
    /// `accuracy` carries an externally supplied estimate.
    pub fn unscored(accuracy: f64) -> Self {
        Self {
            mae: 0.0,
            mape: None,
            rmse: 0.0,
            accuracy: accuracy.clamp(0.0, 1.0),
        }
    }
}

/// Accuracy estimate used when there is no test window:
/// `min(0.95, 0.6 + 0.01 * train_len)`.
pub fn heuristic_accuracy(train_len: usize) -> f64 {
    (0.6 + 0.01 * train_len as f64).min(0.95)
}

/// Compare predictions against actuals.
///
/// Both slices are aligned to the shorter length. MAPE skips points whose
/// actual value is zero and is `None` if no point remains. Never fails:
/// empty input yields zero errors and zero accuracy.
///
/// # Example
/// ```
/// use demand_forecast::evaluate;
///
/// let m = evaluate(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
/// assert!(m.mape.is_none());
/// assert_eq!(m.accuracy, 0.0);
/// ```
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> EvaluationMetrics {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return EvaluationMetrics {
            mae: 0.0,
            mape: None,
            rmse: 0.0,
            accuracy: 0.0,
        };
    }
    let actual = &actual[..n];
    let predicted = &predicted[..n];
    let nf = n as f64;

    let mae = mae(actual, predicted);
    let rmse = rmse(actual, predicted);

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });
    let mape = if pct_count == 0 {
        None
    } else {
        Some(100.0 * pct_sum / pct_count as f64)
    };

    let mean_actual = actual.iter().sum::<f64>() / nf;
    let accuracy = if mean_actual > 0.0 {
        (1.0 - mae / mean_actual).clamp(0.0, 1.0)
    } else {
        0.0
    };

    EvaluationMetrics {
        mae,
        mape,
        rmse,
        accuracy,
    }
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_prediction() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let m = evaluate(&actual, &actual);

        assert_relative_eq!(m.mae, 0.0, epsilon = 1e-10);
        assert_relative_eq!(m.rmse, 0.0, epsilon = 1e-10);
        assert_relative_eq!(m.mape.unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(m.accuracy, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn known_values() {
        let actual = vec![10.0, 20.0, 30.0, 40.0];
        let predicted = vec![12.0, 18.0, 33.0, 37.0];
        // Errors: 2, 2, 3, 3
        let m = evaluate(&actual, &predicted);

        assert_relative_eq!(m.mae, 2.5, epsilon = 1e-10);
        assert_relative_eq!(m.rmse, 6.5_f64.sqrt(), epsilon = 1e-10);
        // (0.2 + 0.1 + 0.1 + 0.075) / 4 * 100
        assert_relative_eq!(m.mape.unwrap(), 11.875, epsilon = 1e-10);
        assert_relative_eq!(m.accuracy, 0.9, epsilon = 1e-10);
    }

    #[test]
    fn mape_skips_zero_actuals() {
        let m = evaluate(&[0.0, 10.0], &[5.0, 12.0]);
        assert_relative_eq!(m.mape.unwrap(), 20.0, epsilon = 1e-10);
    }

    #[test]
    fn mape_undefined_when_all_actuals_zero() {
        let m = evaluate(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);

        assert!(m.mape.is_none());
        assert_relative_eq!(m.mae, 2.0, epsilon = 1e-10);
        assert_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn mape_serializes_as_null() {
        let m = evaluate(&[0.0], &[1.0]);
        let json = serde_json::to_value(m).unwrap();
        assert!(json["mape"].is_null());
    }

    #[test]
    fn aligns_to_shorter_input() {
        let m = evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert_relative_eq!(m.mae, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn empty_input_scores_zero() {
        let m = evaluate(&[], &[]);
        assert_eq!(m.accuracy, 0.0);
        assert!(m.mape.is_none());
    }

    #[test]
    fn accuracy_clamped_at_zero_for_terrible_predictions() {
        let m = evaluate(&[1.0, 1.0], &[10.0, 10.0]);
        assert_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn heuristic_accuracy_grows_then_caps() {
        assert_relative_eq!(heuristic_accuracy(7), 0.67, epsilon = 1e-10);
        assert_relative_eq!(heuristic_accuracy(100), 0.95, epsilon = 1e-10);
    }

    #[test]
    fn standalone_errors() {
        assert_relative_eq!(mae(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]), 0.5, epsilon = 1e-10);
        assert_relative_eq!(rmse(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]), 1.0, epsilon = 1e-10);
        assert!(mse(&[1.0], &[]).is_nan());
    }
}
