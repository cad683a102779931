//! Forecast structure holding point predictions and optional bands.

use crate::utils::stats::std_dev;

/// Point predictions with optional lower/upper confidence bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    /// Point predictions, one per step.
    point: Vec<f64>,
    /// Lower confidence bounds (optional).
    lower: Option<Vec<f64>>,
    /// Upper confidence bounds (optional).
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions only.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with confidence bounds.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    /// Lower bounds, when the model produced them.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Upper bounds, when the model produced them.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Whether both bounds are present.
    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Drop any bounds, keeping the point predictions.
    pub fn without_intervals(self) -> Self {
        Self::from_values(self.point)
    }

    /// Replace the bounds.
    pub fn with_intervals(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }

    /// Clamp predictions (and bounds) so nothing is negative.
    pub fn clamp_non_negative(mut self) -> Self {
        for v in &mut self.point {
            *v = v.max(0.0);
        }
        for bound in [self.lower.as_mut(), self.upper.as_mut()].into_iter().flatten() {
            for v in bound.iter_mut() {
                *v = v.max(0.0);
            }
        }
        self
    }

    /// Whether the predictions form a flat line (stdev below `threshold`).
    ///
    /// Forecasts with fewer than two steps are never considered flat.
    pub fn is_flat(&self, threshold: f64) -> bool {
        if self.point.len() < 2 {
            return false;
        }
        std_dev(&self.point) < threshold
    }

    /// Consume into `(values, lower, upper)`.
    pub fn into_parts(self) -> (Vec<f64>, Option<Vec<f64>>, Option<Vec<f64>>) {
        (self.point, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_manages_prediction_intervals() {
        let forecast = Forecast::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.has_intervals());
        assert!(forecast.lower().is_none());

        let forecast = forecast.with_intervals(vec![0.5, 1.5, 2.5], vec![1.5, 2.5, 3.5]);
        assert!(forecast.has_intervals());
        assert_eq!(forecast.lower().unwrap(), &[0.5, 1.5, 2.5]);
        assert_eq!(forecast.upper().unwrap(), &[1.5, 2.5, 3.5]);

        let stripped = forecast.without_intervals();
        assert!(!stripped.has_intervals());
        assert_eq!(stripped.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn clamp_removes_negatives_everywhere() {
        let forecast = Forecast::from_values_with_intervals(
            vec![-1.0, 2.0],
            vec![-3.0, 1.0],
            vec![0.5, 3.0],
        )
        .clamp_non_negative();

        assert_eq!(forecast.values(), &[0.0, 2.0]);
        assert_eq!(forecast.lower().unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn flatness_detection() {
        assert!(Forecast::from_values(vec![5.0; 10]).is_flat(0.01));
        assert!(!Forecast::from_values(vec![5.0, 5.1, 5.2]).is_flat(0.01));
        assert!(!Forecast::from_values(vec![5.0]).is_flat(0.01));
        assert!(Forecast::new().is_empty());
    }
}
