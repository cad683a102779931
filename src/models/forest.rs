//! Random-forest regressor on lag features, projected recursively.

use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastMethod, Forecaster};

type Regressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random-forest settings.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Lags (in days) used as features.
    pub lags: Vec<usize>,
    /// Windows for trailing-mean features.
    pub rolling_windows: Vec<usize>,
    /// Fewest complete feature rows accepted for fitting.
    pub min_rows: usize,
    /// Number of trees.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: u16,
    /// Seed for bootstrap sampling.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 2, 3, 7, 14, 28],
            rolling_windows: vec![7, 14],
            min_rows: 10,
            n_trees: 100,
            max_depth: 10,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Set the number of trees.
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the lags used as features.
    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    /// History needed before the first complete feature row.
    pub fn warmup(&self) -> usize {
        self.lags
            .iter()
            .chain(self.rolling_windows.iter())
            .copied()
            .max()
            .unwrap_or(1)
    }

    /// Feature row predicting the value right after `history`.
    ///
    /// `history` must hold at least [`ForestConfig::warmup`] points.
    fn features(&self, history: &[f64]) -> Vec<f64> {
        let n = history.len();
        let lags = self.lags.iter().map(|&lag| history[n - lag]);
        let means = self.rolling_windows.iter().map(|&w| {
            let window = &history[n - w..];
            window.iter().sum::<f64>() / w as f64
        });
        lags.chain(means).collect()
    }
}

/// Random-forest forecaster.
///
/// Each training row pairs a day's demand with its lagged values and the
/// trailing means of the days before it. Days without a full lag window
/// are dropped. Forecasts are recursive: every prediction becomes a lag
/// input for the next step.
pub struct RandomForest {
    config: ForestConfig,
    model: Option<Regressor>,
    history: Vec<f64>,
    rows: usize,
}

impl RandomForest {
    /// Create an unfitted model.
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            model: None,
            history: Vec::new(),
            rows: 0,
        }
    }

    /// Training rows used by the last fit.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Build the `(features, target)` table from a series.
    pub(crate) fn feature_table(&self, values: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let warmup = self.config.warmup();
        (warmup..values.len())
            .map(|t| (self.config.features(&values[..t]), values[t]))
            .unzip()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl std::fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomForest")
            .field("config", &self.config)
            .field("fitted", &self.model.is_some())
            .field("rows", &self.rows)
            .finish()
    }
}

impl Forecaster for RandomForest {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        if self
            .config
            .lags
            .iter()
            .chain(self.config.rolling_windows.iter())
            .any(|&w| w == 0)
        {
            return Err(ForecastError::InvalidParameter(
                "lags and rolling windows must be at least one day".to_string(),
            ));
        }

        let values = series.values();
        let (x, y) = self.feature_table(values);
        let needed = self.config.min_rows.max(1);
        if x.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: x.len(),
            });
        }

        let matrix =
            DenseMatrix::from_2d_vec(&x).map_err(|e| ForecastError::FitFailure(e.to_string()))?;
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.config.n_trees)
            .with_max_depth(self.config.max_depth)
            .with_seed(self.config.seed);
        let model = RandomForestRegressor::fit(&matrix, &y, params)
            .map_err(|e| ForecastError::FitFailure(e.to_string()))?;

        debug!(rows = x.len(), n_trees = self.config.n_trees, "random forest fitted");
        self.model = Some(model);
        self.history = values.to_vec();
        self.rows = x.len();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let model = self.model.as_ref().ok_or(ForecastError::FitRequired)?;
        let mut history = self.history.clone();
        let mut predictions = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let row = self.config.features(&history);
            let input = DenseMatrix::from_2d_vec(&vec![row])
                .map_err(|e| ForecastError::FitFailure(e.to_string()))?;
            let next = model
                .predict(&input)
                .map_err(|e| ForecastError::FitFailure(e.to_string()))?
                .first()
                .copied()
                .ok_or_else(|| ForecastError::FitFailure("no prediction returned".to_string()))?;
            let next = if next.is_finite() { next.max(0.0) } else { 0.0 };
            predictions.push(next);
            history.push(next);
        }

        Ok(Forecast::from_values(predictions))
    }

    fn name(&self) -> &str {
        "RandomForest"
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::RandomForest {
            rows: self.rows,
            n_trees: self.config.n_trees,
        }
    }
}
