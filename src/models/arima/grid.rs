//! Exhaustive ARIMA order search by AIC.

use tracing::{debug, info, warn};

use crate::core::{DailySeries, Forecast, ModelKind};
use crate::error::{ForecastError, Result};
use crate::models::arima::model::{ARIMASpec, ARIMA};
use crate::models::moving_average::{MovingAverage, MovingAverageConfig};
use crate::models::{ForecastMethod, Forecaster, TrainedModel};

/// Fewest training points the ARIMA trainer accepts.
pub const MIN_ARIMA_POINTS: usize = 7;

/// Configuration for the ARIMA grid search.
#[derive(Debug, Clone)]
pub struct ARIMAGridConfig {
    /// Maximum AR order to consider.
    pub max_p: usize,
    /// Maximum differencing order.
    pub max_d: usize,
    /// Maximum MA order to consider.
    pub max_q: usize,
    /// Explicit candidate orders; replaces the `max_*` grid when set.
    pub orders: Option<Vec<ARIMASpec>>,
    /// Order tried when no grid candidate fits.
    pub fallback: ARIMASpec,
    /// Series with a coefficient of variation below this skip ARIMA.
    pub degenerate_cv: f64,
    /// Projections with a standard deviation below this count as flat.
    pub flat_threshold: f64,
}

impl Default for ARIMAGridConfig {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_d: 1,
            max_q: 2,
            orders: None,
            fallback: ARIMASpec::new(1, 1, 1),
            degenerate_cv: 0.01,
            flat_threshold: 0.01,
        }
    }
}

impl ARIMAGridConfig {
    /// Set maximum orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Search exactly these orders instead of the full grid.
    pub fn with_orders(mut self, orders: Vec<ARIMASpec>) -> Self {
        self.orders = Some(orders);
        self
    }

    /// Set the fallback order.
    pub fn with_fallback(mut self, fallback: ARIMASpec) -> Self {
        self.fallback = fallback;
        self
    }

    /// Candidate orders in search order (p, then d, then q).
    pub fn candidates(&self) -> Vec<ARIMASpec> {
        if let Some(orders) = &self.orders {
            return orders.clone();
        }
        let mut orders = Vec::new();
        for p in 0..=self.max_p {
            for d in 0..=self.max_d {
                for q in 0..=self.max_q {
                    orders.push(ARIMASpec::new(p, d, q));
                }
            }
        }
        orders
    }
}

/// ARIMA with the order chosen by grid search.
///
/// Every candidate order is fitted; failures are skipped and the lowest
/// AIC wins. If nothing fits, the configured fallback order is tried once
/// more before giving up. Near-constant series are rejected up front with
/// [`ForecastError::DegenerateSeries`].
#[derive(Debug, Clone)]
pub struct ARIMAGrid {
    config: ARIMAGridConfig,
    selected: Option<ARIMA>,
    model_scores: Vec<(ARIMASpec, f64)>,
}

impl ARIMAGrid {
    /// Create a grid search with default configuration.
    pub fn new() -> Self {
        Self::with_config(ARIMAGridConfig::default())
    }

    /// Create a grid search with custom configuration.
    pub fn with_config(config: ARIMAGridConfig) -> Self {
        Self {
            config,
            selected: None,
            model_scores: Vec::new(),
        }
    }

    /// Order of the selected model.
    pub fn selected_order(&self) -> Option<ARIMASpec> {
        self.selected.as_ref().map(|m| m.spec())
    }

    /// AIC of every candidate that fitted.
    pub fn model_scores(&self) -> &[(ARIMASpec, f64)] {
        &self.model_scores
    }

    fn fit_order(spec: ARIMASpec, series: &DailySeries) -> Result<ARIMA> {
        let mut model = ARIMA::from_spec(spec);
        model.fit(series)?;
        Ok(model)
    }
}

impl Default for ARIMAGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for ARIMAGrid {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        if series.len() < MIN_ARIMA_POINTS {
            return Err(ForecastError::InsufficientHistory {
                needed: MIN_ARIMA_POINTS,
                got: series.len(),
            });
        }
        // All-zero history has no coefficient of variation; treat it as flat.
        let cv = series.coefficient_of_variation().unwrap_or(0.0);
        if cv < self.config.degenerate_cv {
            return Err(ForecastError::DegenerateSeries { cv });
        }

        self.selected = None;
        self.model_scores.clear();
        let mut best: Option<(ARIMA, f64)> = None;

        for spec in self.config.candidates() {
            match Self::fit_order(spec, series) {
                Ok(model) => {
                    let aic = model.aic().unwrap_or(f64::INFINITY);
                    self.model_scores.push((spec, aic));
                    if best.as_ref().map_or(true, |(_, best_aic)| aic < *best_aic) {
                        best = Some((model, aic));
                    }
                }
                Err(e) => debug!(order = %spec, error = %e, "skipping ARIMA candidate"),
            }
        }

        let model = match best {
            Some((model, _)) => model,
            None => {
                let fallback = self.config.fallback;
                warn!(order = %fallback, "no ARIMA candidate fitted, trying fallback order");
                Self::fit_order(fallback, series)?
            }
        };

        debug!(order = %model.spec(), aic = ?model.aic(), "ARIMA order selected");
        self.selected = Some(model);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict_with_intervals(horizon, level)
    }

    fn name(&self) -> &str {
        "ARIMA"
    }

    fn is_fitted(&self) -> bool {
        self.selected.is_some()
    }

    fn method(&self) -> ForecastMethod {
        match &self.selected {
            Some(model) => model.method(),
            None => ForecastMethod::Arima {
                order: self.config.fallback,
                aic: None,
            },
        }
    }
}

/// Moving average tagged as ARIMA, with bands.
pub fn train_moving_average(
    series: &DailySeries,
    config: &MovingAverageConfig,
) -> Result<TrainedModel> {
    let mut model = MovingAverage::new(config.clone());
    model.fit(series)?;
    Ok(TrainedModel::new(ModelKind::Arima, Box::new(model), series).with_intervals())
}

/// Train the ARIMA path on `series`.
///
/// Near-constant input goes straight to the moving average. A fitted grid
/// model carries a flat-line guard that switches to the moving average
/// when its projection does not move.
pub fn train_arima(
    series: &DailySeries,
    config: &ARIMAGridConfig,
    fallback: &MovingAverageConfig,
) -> Result<TrainedModel> {
    let mut grid = ARIMAGrid::with_config(config.clone());
    match grid.fit(series) {
        Ok(()) => {
            let mut guard = MovingAverage::new(fallback.clone());
            guard.fit(series)?;
            Ok(TrainedModel::new(ModelKind::Arima, Box::new(grid), series)
                .with_intervals()
                .with_flat_guard(config.flat_threshold, guard))
        }
        Err(ForecastError::DegenerateSeries { cv }) => {
            info!(cv, "degenerate series, using moving average instead of ARIMA");
            train_moving_average(series, fallback)
        }
        Err(e) => Err(e),
    }
}
