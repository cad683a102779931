//! Moving average with a deterministic linear trend.
//!
//! Used when ARIMA cannot be trusted: near-constant history, a flat ARIMA
//! projection, or a failed grid search.

use tracing::debug;

use crate::core::interval::{effective_std_dev, with_heuristic_bounds};
use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastMethod, Forecaster};
use crate::utils::stats::{linear_slope, mean};

/// Moving-average fallback settings.
#[derive(Debug, Clone)]
pub struct MovingAverageConfig {
    /// Points averaged for the level.
    pub window: usize,
    /// Points used for the least-squares trend.
    pub trend_window: usize,
    /// Largest trend per step, as a fraction of the level.
    pub max_trend_fraction: f64,
    /// Smallest trend per step, as a fraction of the level.
    pub min_trend_fraction: f64,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            window: 7,
            trend_window: 7,
            max_trend_fraction: 0.01,
            min_trend_fraction: 0.002,
        }
    }
}

impl MovingAverageConfig {
    /// Set the averaging window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Set the trend bounds as fractions of the level.
    pub fn with_trend_bounds(mut self, min_fraction: f64, max_fraction: f64) -> Self {
        self.min_trend_fraction = min_fraction;
        self.max_trend_fraction = max_fraction;
        self
    }
}

/// Mean of the last `window` points plus a bounded, never-zero drift.
///
/// `forecast[h] = level + trend * (h + 1)`. The trend is the least-squares
/// slope of the recent history clamped to `±max_trend_fraction * level`
/// and pushed out to at least `min_trend_fraction * level`, so even a
/// constant series gets a slightly sloped line.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    config: MovingAverageConfig,
    level: Option<f64>,
    trend: f64,
    effective_std: f64,
}

impl MovingAverage {
    /// Create an unfitted model.
    pub fn new(config: MovingAverageConfig) -> Self {
        Self {
            config,
            level: None,
            trend: 0.0,
            effective_std: 0.0,
        }
    }

    /// Fitted level.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Fitted per-step trend.
    pub fn trend(&self) -> f64 {
        self.trend
    }

    fn bounded_trend(&self, raw: f64, level: f64) -> f64 {
        let max = self.config.max_trend_fraction * level.abs();
        let min = self.config.min_trend_fraction * level.abs();
        let trend = if raw.is_finite() { raw.clamp(-max, max) } else { 0.0 };
        if trend.abs() < min {
            if trend < 0.0 {
                -min
            } else {
                min
            }
        } else {
            trend
        }
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(MovingAverageConfig::default())
    }
}

impl Forecaster for MovingAverage {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::InsufficientHistory { needed: 1, got: 0 });
        }
        let values = series.values();
        let window = &values[values.len().saturating_sub(self.config.window.max(1))..];
        let level = mean(window);
        let recent = &values[values.len().saturating_sub(self.config.trend_window)..];

        self.trend = self.bounded_trend(linear_slope(recent), level);
        self.level = Some(level);
        self.effective_std = effective_std_dev(values);

        debug!(level, trend = self.trend, "moving average fitted");
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let values = (1..=horizon)
            .map(|h| (level + self.trend * h as f64).max(0.0))
            .collect();
        Ok(Forecast::from_values(values))
    }

    fn predict_with_intervals(&self, horizon: usize, _level: f64) -> Result<Forecast> {
        let forecast = self.predict(horizon)?;
        Ok(with_heuristic_bounds(forecast, self.effective_std))
    }

    fn name(&self) -> &str {
        "MovingAverage"
    }

    fn is_fitted(&self) -> bool {
        self.level.is_some()
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::MovingAverage {
            level: self.level.unwrap_or(f64::NAN),
            trend: self.trend,
            window: self.config.window,
        }
    }
}
