//! Forecaster trait defining the common interface for all models.

use serde::Serialize;
use tracing::info;

use crate::core::interval::{effective_std_dev, sanitize};
use crate::core::{DailySeries, Forecast, ModelKind};
use crate::error::Result;
use crate::models::arima::ARIMASpec;
use crate::models::moving_average::MovingAverage;

/// Common interface for all forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to a daily series.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        // Default implementation just returns point predictions
        let _ = level;
        self.predict(horizon)
    }

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;

    /// Describe the fitted state for diagnostics.
    fn method(&self) -> ForecastMethod;
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use demand_forecast::models::{BoxedForecaster, Forecaster};
/// use demand_forecast::models::seasonal::SeasonalNaive;
///
/// let model: BoxedForecaster = Box::new(SeasonalNaive::new());
/// assert_eq!(model.name(), "SeasonalNaive");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Where a seasonal pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Mean per weekday over the whole history.
    DayOfWeek,
    /// The literal last seven observations.
    LastWeek,
    /// The last observation repeated.
    LastValue,
}

/// How a forecast was actually produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Fitted ARIMA model.
    Arima { order: ARIMASpec, aic: Option<f64> },
    /// Moving average with a deterministic trend.
    MovingAverage { level: f64, trend: f64, window: usize },
    /// Random forest on lag features.
    RandomForest { rows: usize, n_trees: usize },
    /// Repeated seasonal pattern.
    SeasonalPattern {
        source: PatternSource,
        pattern: Vec<f64>,
    },
    /// Synthetic placeholder curve.
    Synthetic,
}

/// Forecast plus the method that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub forecast: Forecast,
    pub method: ForecastMethod,
}

/// A fitted model tagged with the kind it was trained for.
///
/// Models with native bands get their intervals clamped; the others report
/// point forecasts only. An optional flat-line guard swaps in a moving
/// average fitted on the same history when the projection is flat.
pub struct TrainedModel {
    kind: ModelKind,
    model: BoxedForecaster,
    train_size: usize,
    effective_std: f64,
    intervals: bool,
    flat_guard: Option<(f64, MovingAverage)>,
}

impl TrainedModel {
    /// Wrap a fitted model trained on `history`.
    pub fn new(kind: ModelKind, model: BoxedForecaster, history: &DailySeries) -> Self {
        Self {
            kind,
            model,
            train_size: history.len(),
            effective_std: effective_std_dev(history.values()),
            intervals: false,
            flat_guard: None,
        }
    }

    /// Report confidence bands for this model.
    pub fn with_intervals(mut self) -> Self {
        self.intervals = true;
        self
    }

    /// Replace flat projections (stdev below `threshold`) with `fallback`.
    pub fn with_flat_guard(mut self, threshold: f64, fallback: MovingAverage) -> Self {
        self.flat_guard = Some((threshold, fallback));
        self
    }

    /// The kind this model was trained for.
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Number of points the model was fitted on.
    pub fn train_size(&self) -> usize {
        self.train_size
    }

    /// The underlying model.
    pub fn model(&self) -> &dyn Forecaster {
        self.model.as_ref()
    }

    /// Project `periods` days ahead.
    ///
    /// Point values are never negative. When bands are reported they
    /// satisfy `0 <= lower <= value <= upper`.
    pub fn forecast(&self, periods: usize, level: f64) -> Result<Projection> {
        if !self.intervals {
            let forecast = self
                .model
                .predict(periods)?
                .without_intervals()
                .clamp_non_negative();
            return Ok(Projection {
                forecast,
                method: self.model.method(),
            });
        }

        let forecast = self.model.predict_with_intervals(periods, level)?;
        if let Some((threshold, fallback)) = &self.flat_guard {
            if forecast.is_flat(*threshold) {
                info!(
                    model = self.model.name(),
                    periods, "flat projection, using moving-average fallback"
                );
                let forecast = fallback.predict_with_intervals(periods, level)?;
                return Ok(Projection {
                    forecast: sanitize(forecast, self.effective_std),
                    method: fallback.method(),
                });
            }
        }

        Ok(Projection {
            forecast: sanitize(forecast, self.effective_std),
            method: self.model.method(),
        })
    }
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("kind", &self.kind)
            .field("model", &self.model.name())
            .field("train_size", &self.train_size)
            .field("intervals", &self.intervals)
            .finish()
    }
}
