//! ARIMA (Autoregressive Integrated Moving Average) model.

use serde::Serialize;

use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate};
use crate::models::{ForecastMethod, Forecaster};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::z_score;

/// ARIMA model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    /// Create a new ARIMA specification.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Total number of parameters.
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1 // AR + MA + intercept
    }

    /// Fewest observations a fit of this order accepts.
    pub fn min_observations(&self) -> usize {
        self.d + self.p.max(self.q) + 2
    }
}

impl Default for ARIMASpec {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl std::fmt::Display for ARIMASpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// State of a successful fit.
#[derive(Debug, Clone)]
struct FittedState {
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    original: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    residual_variance: f64,
    aic: f64,
}

/// ARIMA forecasting model fitted by conditional sum of squares.
///
/// ARIMA(p, d, q) combines:
/// - AR(p): Autoregressive component
/// - I(d): Differencing for stationarity
/// - MA(q): Moving average component
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    state: Option<FittedState>,
}

impl ARIMA {
    /// Create a new ARIMA model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    /// Create a model for an existing order.
    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self { spec, state: None }
    }

    /// Get the model specification.
    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    /// AR coefficients (empty before fitting).
    pub fn ar_coefficients(&self) -> &[f64] {
        self.state.as_ref().map(|s| s.ar.as_slice()).unwrap_or(&[])
    }

    /// MA coefficients (empty before fitting).
    pub fn ma_coefficients(&self) -> &[f64] {
        self.state.as_ref().map(|s| s.ma.as_slice()).unwrap_or(&[])
    }

    /// Akaike information criterion of the fit.
    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    /// Variance of the in-sample one-step residuals.
    pub fn residual_variance(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.residual_variance)
    }

    /// One-step residuals on the differenced scale for given parameters.
    fn residuals_for(diff: &[f64], p: usize, q: usize, ar: &[f64], ma: &[f64], intercept: f64) -> Vec<f64> {
        let start = p.max(q);
        let mut residuals = vec![0.0; diff.len()];
        for t in start..diff.len() {
            let mut pred = intercept;
            for i in 0..p {
                pred += ar[i] * (diff[t - 1 - i] - intercept);
            }
            for i in 0..q {
                pred += ma[i] * residuals[t - 1 - i];
            }
            residuals[t] = diff[t] - pred;
        }
        residuals
    }

    /// Estimate `(intercept, ar, ma)` by minimising the conditional sum of squares.
    fn estimate(&self, diff: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let (p, q) = (self.spec.p, self.spec.q);
        let mean = diff.iter().sum::<f64>() / diff.len() as f64;
        if p == 0 && q == 0 {
            return (mean, Vec::new(), Vec::new());
        }

        let mut initial = vec![0.0; p + q + 1];
        initial[0] = mean;
        for i in 0..p {
            initial[1 + i] = 0.1 / (i + 1) as f64;
        }
        for i in 0..q {
            initial[1 + p + i] = 0.1 / (i + 1) as f64;
        }

        // Keep AR stationary and MA invertible (coefficientwise).
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

        let start = p.max(q);
        let result = nelder_mead(
            |params| {
                let residuals =
                    Self::residuals_for(diff, p, q, &params[1..1 + p], &params[1 + p..], params[0]);
                residuals[start..].iter().map(|r| r * r).sum()
            },
            &initial,
            Some(bounds.as_slice()),
            NelderMeadConfig::default(),
        );

        let point = result.optimal_point;
        (point[0], point[1..1 + p].to_vec(), point[1 + p..].to_vec())
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::from_spec(ARIMASpec::default())
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let values = series.values();
        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: values.len(),
            });
        }

        let differenced = difference(values, self.spec.d);
        let (intercept, ar, ma) = self.estimate(&differenced);
        if !intercept.is_finite() || ar.iter().chain(ma.iter()).any(|c| !c.is_finite()) {
            return Err(ForecastError::FitFailure(format!(
                "ARIMA{} produced non-finite coefficients",
                self.spec
            )));
        }

        let start = self.spec.p.max(self.spec.q);
        let residuals =
            Self::residuals_for(&differenced, self.spec.p, self.spec.q, &ar, &ma, intercept);
        let effective = &residuals[start..];
        let n_eff = effective.len() as f64;
        let residual_variance = effective.iter().map(|r| r * r).sum::<f64>() / n_eff;

        let k = self.spec.num_params() as f64;
        let log_likelihood =
            -0.5 * n_eff * (1.0 + residual_variance.ln() + (2.0 * std::f64::consts::PI).ln());
        let aic = -2.0 * log_likelihood + 2.0 * k;
        if !aic.is_finite() {
            return Err(ForecastError::FitFailure(format!(
                "ARIMA{} has non-finite AIC (residual variance {residual_variance})",
                self.spec
            )));
        }

        self.state = Some(FittedState {
            ar,
            ma,
            intercept,
            original: values.to_vec(),
            differenced,
            residuals,
            residual_variance,
            aic,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let (p, q) = (self.spec.p, self.spec.q);
        let mut diff = state.differenced.clone();
        let mut residuals = state.residuals.clone();
        let observed = diff.len();

        for _ in 0..horizon {
            let t = diff.len();
            let mut pred = state.intercept;
            for i in 0..p.min(t) {
                pred += state.ar[i] * (diff[t - 1 - i] - state.intercept);
            }
            for i in 0..q.min(t) {
                pred += state.ma[i] * residuals[t - 1 - i];
            }
            diff.push(pred);
            // Future shocks have zero expectation.
            residuals.push(0.0);
        }

        let projected = &diff[observed..];
        let predictions = if self.spec.d > 0 {
            integrate(projected, &state.original, self.spec.d)
        } else {
            projected.to_vec()
        };
        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let forecast = self.predict(horizon)?;
        let variance = self.residual_variance().unwrap_or(0.0);
        if forecast.is_empty() {
            return Ok(forecast);
        }

        let z = z_score(level);
        let (lower, upper): (Vec<f64>, Vec<f64>) = forecast
            .values()
            .iter()
            .enumerate()
            .map(|(i, pred)| {
                // Simplified: variance grows linearly with the horizon.
                let se = (variance * (i + 1) as f64).sqrt();
                (pred - z * se, pred + z * se)
            })
            .unzip();
        Ok(forecast.with_intervals(lower, upper))
    }

    fn name(&self) -> &str {
        "ARIMA"
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::Arima {
            order: self.spec,
            aic: self.aic(),
        }
    }
}
