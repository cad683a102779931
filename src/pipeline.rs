//! End-to-end forecasting: ETL, split, train, evaluate, select, project.

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ForecastCache};
use crate::core::{
    CandidateScore, DailySeries, ForecastDiagnostics, ForecastResult, ModelKind, RawSalesRecord,
    TrainTestSplit,
};
use crate::error::{ForecastError, Result};
use crate::etl::{run_etl, EtlConfig, EtlOutput};
use crate::models::arima::{train_arima, train_moving_average, ARIMAGridConfig};
use crate::models::{
    default_forecast, train_forest, train_seasonal, ForecastMethod, ForestConfig,
    MovingAverageConfig, Projection, SyntheticConfig, TrainedModel, SYNTHETIC_ACCURACY,
};
use crate::selection::{select_best, DEFAULT_TIE_BREAK_TOLERANCE};
use crate::utils::metrics::{evaluate, heuristic_accuracy, EvaluationMetrics};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Fraction of the series held out for evaluation.
    pub test_size: f64,
    /// Series are padded to at least this many points; also the smallest
    /// training portion a split leaves.
    pub min_series_len: usize,
    /// Series shorter than this are not split.
    pub min_split_len: usize,
    /// Outlier threshold in standard deviations.
    pub outlier_sigma: f64,
    /// Outlier removal only runs on series longer than this.
    pub outlier_min_len: usize,
    /// Pad value for an empty series.
    pub pad_default: f64,
    /// Relative accuracy gap within which ARIMA is preferred.
    pub tie_break_tolerance: f64,
    /// Confidence level for ARIMA bands.
    pub confidence_level: f64,
    /// Attach [`ForecastDiagnostics`] to results.
    pub explain: bool,
    pub arima: ARIMAGridConfig,
    pub forest: ForestConfig,
    pub moving_average: MovingAverageConfig,
    pub synthetic: SyntheticConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            min_series_len: 7,
            min_split_len: 10,
            outlier_sigma: 3.0,
            outlier_min_len: 10,
            pad_default: 20.0,
            tie_break_tolerance: DEFAULT_TIE_BREAK_TOLERANCE,
            confidence_level: 0.95,
            explain: false,
            arima: ARIMAGridConfig::default(),
            forest: ForestConfig::default(),
            moving_average: MovingAverageConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Set the held-out fraction.
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the confidence level for ARIMA bands.
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Set the ARIMA tie-break tolerance.
    pub fn with_tie_break_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_break_tolerance = tolerance;
        self
    }

    /// Attach diagnostics to every result.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Set the ARIMA grid configuration.
    pub fn with_arima(mut self, arima: ARIMAGridConfig) -> Self {
        self.arima = arima;
        self
    }

    /// Set the random-forest configuration.
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Set the moving-average fallback configuration.
    pub fn with_moving_average(mut self, moving_average: MovingAverageConfig) -> Self {
        self.moving_average = moving_average;
        self
    }

    /// Set the synthetic forecast shape.
    pub fn with_synthetic(mut self, synthetic: SyntheticConfig) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// ETL settings derived from this configuration.
    pub fn etl_config(&self) -> EtlConfig {
        EtlConfig {
            outlier_sigma: self.outlier_sigma,
            outlier_min_len: self.outlier_min_len,
            min_points: self.min_series_len,
            pad_default: self.pad_default,
        }
    }
}

/// A model that was trained, scored and projected.
struct Evaluated {
    kind: ModelKind,
    projection: Projection,
    metrics: EvaluationMetrics,
}

/// Demand forecasting pipeline.
///
/// Holds only configuration; every call works on its own copy of the
/// input, so one forecaster can serve many independent requests.
///
/// # Example
/// ```
/// use chrono::{Duration, NaiveDate};
/// use demand_forecast::core::{ModelKind, RawSalesRecord};
/// use demand_forecast::pipeline::{DemandForecaster, ForecastConfig};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let records: Vec<_> = (0..21)
///     .map(|i| RawSalesRecord::on_date(start + Duration::days(i), 10.0 + (i % 7) as f64))
///     .collect();
///
/// let forecaster = DemandForecaster::new(ForecastConfig::default());
/// let result = forecaster.generate_forecast(&records, 14, Some(ModelKind::Seasonal));
/// assert_eq!(result.forecast_values.len(), 14);
/// assert_eq!(result.model_type, ModelKind::Seasonal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DemandForecaster {
    config: ForecastConfig,
}

impl DemandForecaster {
    /// Create a forecaster.
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `periods` days of demand.
    ///
    /// With `model` set, only that model is trained; if it (and its own
    /// fallbacks) fail, the synthetic default is returned tagged with the
    /// requested kind. Without `model`, all trainable kinds compete and a
    /// failing model is skipped. Never fails.
    pub fn generate_forecast(
        &self,
        records: &[RawSalesRecord],
        periods: usize,
        model: Option<ModelKind>,
    ) -> ForecastResult {
        let etl = run_etl(records, &self.config.etl_config());
        self.forecast_from_etl(&etl, periods, model)
    }

    /// Same as [`DemandForecaster::generate_forecast`], memoized on the
    /// loaded series, the requested model and the horizon.
    pub fn generate_forecast_cached(
        &self,
        cache: &mut ForecastCache,
        records: &[RawSalesRecord],
        periods: usize,
        model: Option<ModelKind>,
    ) -> ForecastResult {
        let etl = run_etl(records, &self.config.etl_config());
        let key = CacheKey::new(etl.series.fingerprint(), model, periods);
        cache
            .get_or_insert_with(key, || self.forecast_from_etl(&etl, periods, model))
            .clone()
    }

    fn forecast_from_etl(
        &self,
        etl: &EtlOutput,
        periods: usize,
        model: Option<ModelKind>,
    ) -> ForecastResult {
        let series = match etl.require_data() {
            Ok(series) => series,
            Err(e) => {
                info!(error = %e, "returning default forecast");
                let tag = model.unwrap_or(ModelKind::Default);
                return self.default_result(etl, periods, tag, 0, 0, Vec::new());
            }
        };

        let split = TrainTestSplit::with_limits(
            series,
            self.config.test_size,
            self.config.min_split_len,
            self.config.min_series_len,
        );
        debug!(
            train = split.train_size(),
            test = split.test_size(),
            "chronological split"
        );

        match model {
            Some(kind) if kind != ModelKind::Default => {
                self.run_pinned(etl, series, &split, periods, kind)
            }
            _ => self.run_selection(etl, series, &split, periods),
        }
    }

    fn run_pinned(
        &self,
        etl: &EtlOutput,
        series: &DailySeries,
        split: &TrainTestSplit,
        periods: usize,
        kind: ModelKind,
    ) -> ForecastResult {
        let mut outcome = self.evaluate_candidate(kind, series, split, periods, |s| {
            self.train(kind, s)
        });
        if kind == ModelKind::Arima {
            outcome = outcome.or_else(|e| {
                info!(error = %e, "ARIMA failed, using moving-average fallback");
                self.evaluate_candidate(kind, series, split, periods, |s| {
                    train_moving_average(s, &self.config.moving_average)
                })
            });
        }

        match outcome {
            Ok(evaluated) => {
                let candidates = vec![CandidateScore {
                    model: kind,
                    accuracy: Some(evaluated.metrics.accuracy),
                    error: None,
                }];
                self.build_result(etl, series, split, evaluated, candidates)
            }
            Err(e) => {
                warn!(model = %kind, error = %e, "requested model failed, returning default forecast");
                let candidates = vec![CandidateScore {
                    model: kind,
                    accuracy: None,
                    error: Some(e.to_string()),
                }];
                self.default_result(
                    etl,
                    periods,
                    kind,
                    split.train_size(),
                    split.test_size(),
                    candidates,
                )
            }
        }
    }

    fn run_selection(
        &self,
        etl: &EtlOutput,
        series: &DailySeries,
        split: &TrainTestSplit,
        periods: usize,
    ) -> ForecastResult {
        let mut evaluated = Vec::new();
        let mut candidates = Vec::new();

        for kind in ModelKind::TRAINABLE {
            match self.evaluate_candidate(kind, series, split, periods, |s| self.train(kind, s)) {
                Ok(e) => {
                    debug!(model = %kind, accuracy = e.metrics.accuracy, "model evaluated");
                    candidates.push(CandidateScore {
                        model: kind,
                        accuracy: Some(e.metrics.accuracy),
                        error: None,
                    });
                    evaluated.push(e);
                }
                Err(e) => {
                    warn!(model = %kind, error = %e, "model skipped");
                    candidates.push(CandidateScore {
                        model: kind,
                        accuracy: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let scores: Vec<(ModelKind, f64)> = evaluated
            .iter()
            .map(|e| (e.kind, e.metrics.accuracy))
            .collect();
        match select_best(&scores, self.config.tie_break_tolerance) {
            Some(i) => {
                let winner = evaluated.swap_remove(i);
                info!(model = %winner.kind, accuracy = winner.metrics.accuracy, "model selected");
                self.build_result(etl, series, split, winner, candidates)
            }
            None => {
                warn!("every model failed, returning default forecast");
                self.default_result(
                    etl,
                    periods,
                    ModelKind::Default,
                    split.train_size(),
                    split.test_size(),
                    candidates,
                )
            }
        }
    }

    fn train(&self, kind: ModelKind, series: &DailySeries) -> Result<TrainedModel> {
        match kind {
            ModelKind::Arima => train_arima(series, &self.config.arima, &self.config.moving_average),
            ModelKind::RandomForest => train_forest(series, &self.config.forest),
            ModelKind::Seasonal => train_seasonal(series),
            ModelKind::Default => Err(ForecastError::InvalidParameter(
                "the default forecast is not a trainable model".to_string(),
            )),
        }
    }

    /// Score a trainer on the held-out window, then refit it on the full
    /// series and project `periods` days past the last observation.
    fn evaluate_candidate<F>(
        &self,
        kind: ModelKind,
        series: &DailySeries,
        split: &TrainTestSplit,
        periods: usize,
        trainer: F,
    ) -> Result<Evaluated>
    where
        F: Fn(&DailySeries) -> Result<TrainedModel>,
    {
        let level = self.config.confidence_level;
        let metrics = if split.has_test() {
            let model = trainer(&split.train)?;
            let held_out = model.forecast(split.test_size(), level)?;
            evaluate(split.test.values(), held_out.forecast.values())
        } else {
            // No held-out window: fitting still has to succeed.
            EvaluationMetrics::unscored(heuristic_accuracy(split.train_size()))
        };

        let model = trainer(series)?;
        let projection = model.forecast(periods, level)?;
        Ok(Evaluated {
            kind,
            projection,
            metrics,
        })
    }

    fn build_result(
        &self,
        etl: &EtlOutput,
        series: &DailySeries,
        split: &TrainTestSplit,
        evaluated: Evaluated,
        candidates: Vec<CandidateScore>,
    ) -> ForecastResult {
        let Evaluated {
            kind,
            projection,
            metrics,
        } = evaluated;
        let (values, lower, upper) = projection.forecast.into_parts();
        let diagnostics = self.diagnostics(etl, Some(series), projection.method, candidates);

        ForecastResult {
            forecast_values: values,
            confidence_lower: lower,
            confidence_upper: upper,
            model_type: kind,
            accuracy_score: metrics.accuracy,
            metrics,
            train_size: split.train_size(),
            test_size: split.test_size(),
            diagnostics,
        }
    }

    fn default_result(
        &self,
        etl: &EtlOutput,
        periods: usize,
        tag: ModelKind,
        train_size: usize,
        test_size: usize,
        candidates: Vec<CandidateScore>,
    ) -> ForecastResult {
        let (values, lower, upper) = default_forecast(periods, &self.config.synthetic).into_parts();
        let metrics = EvaluationMetrics::unscored(SYNTHETIC_ACCURACY);
        let series = (!etl.series.is_empty()).then_some(&etl.series);
        let diagnostics = self.diagnostics(etl, series, ForecastMethod::Synthetic, candidates);

        ForecastResult {
            forecast_values: values,
            confidence_lower: lower,
            confidence_upper: upper,
            model_type: tag,
            accuracy_score: SYNTHETIC_ACCURACY,
            metrics,
            train_size,
            test_size,
            diagnostics,
        }
    }

    fn diagnostics(
        &self,
        etl: &EtlOutput,
        series: Option<&DailySeries>,
        method: ForecastMethod,
        candidates: Vec<CandidateScore>,
    ) -> Option<ForecastDiagnostics> {
        if !self.config.explain {
            return None;
        }
        Some(ForecastDiagnostics {
            etl: etl.report.clone(),
            method,
            candidates,
            avg_daily_demand: series.map(|s| s.mean()),
            last_value: series.and_then(|s| s.values().last().copied()),
        })
    }
}

/// Forecast with the default configuration.
///
/// # Example
/// ```
/// use demand_forecast::core::ModelKind;
/// use demand_forecast::generate_forecast;
///
/// let result = generate_forecast(&[], 30, Some(ModelKind::Arima));
/// assert_eq!(result.forecast_values.len(), 30);
/// assert_eq!(result.model_type, ModelKind::Arima);
/// assert_eq!(result.accuracy_score, 0.5);
/// ```
pub fn generate_forecast(
    records: &[RawSalesRecord],
    periods: usize,
    model: Option<ModelKind>,
) -> ForecastResult {
    DemandForecaster::default().generate_forecast(records, periods, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn records(values: &[f64]) -> Vec<RawSalesRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| RawSalesRecord::on_date(start + Duration::days(i as i64), *v))
            .collect()
    }

    fn weekly(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 30.0 + 8.0 * ((i % 7) as f64) + ((i * 7919) % 5) as f64)
            .collect()
    }

    fn explained() -> DemandForecaster {
        DemandForecaster::new(ForecastConfig::default().with_explain(true))
    }

    #[test]
    fn pinned_seasonal_reports_split_sizes() {
        let result = DemandForecaster::default().generate_forecast(
            &records(&weekly(30)),
            10,
            Some(ModelKind::Seasonal),
        );

        assert_eq!(result.model_type, ModelKind::Seasonal);
        assert_eq!(result.train_size, 24);
        assert_eq!(result.test_size, 6);
        assert_eq!(result.forecast_values.len(), 10);
        assert!(result.confidence_lower.is_none());
        assert_eq!(result.accuracy_score, result.metrics.accuracy);
    }

    #[test]
    fn short_series_uses_heuristic_accuracy() {
        let result = DemandForecaster::default().generate_forecast(
            &records(&[5.0, 7.0, 6.0, 8.0, 5.0, 9.0, 7.0, 6.0]),
            5,
            Some(ModelKind::Seasonal),
        );

        assert_eq!(result.test_size, 0);
        assert_eq!(result.train_size, 8);
        assert!((result.accuracy_score - 0.68).abs() < 1e-12);
        assert!(result.metrics.mape.is_none());
        assert_eq!(result.metrics.mae, 0.0);
    }

    #[test]
    fn selection_lists_every_candidate() {
        let result = explained().generate_forecast(&records(&weekly(30)), 7, None);
        let diagnostics = result.diagnostics.unwrap();

        let kinds: Vec<_> = diagnostics.candidates.iter().map(|c| c.model).collect();
        assert_eq!(
            kinds,
            vec![ModelKind::Arima, ModelKind::RandomForest, ModelKind::Seasonal]
        );
        // 30 points cannot fill 10 rows of 28-day lags.
        let forest = &diagnostics.candidates[1];
        assert!(forest.accuracy.is_none());
        assert!(forest.error.as_deref().unwrap().contains("insufficient history"));
        assert_ne!(result.model_type, ModelKind::RandomForest);
    }

    #[test]
    fn explain_reports_etl_and_demand_summary() {
        let values = weekly(21);
        let result = explained().generate_forecast(&records(&values), 7, Some(ModelKind::Seasonal));
        let diagnostics = result.diagnostics.unwrap();

        assert_eq!(diagnostics.etl.extract.record_count, 21);
        assert_eq!(diagnostics.last_value, values.last().copied());
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((diagnostics.avg_daily_demand.unwrap() - mean).abs() < 1e-9);
        assert!(matches!(
            diagnostics.method,
            ForecastMethod::SeasonalPattern { .. }
        ));
    }

    #[test]
    fn diagnostics_off_by_default() {
        let result = generate_forecast(&records(&weekly(14)), 3, None);
        assert!(result.diagnostics.is_none());
    }

    #[test]
    fn zero_demand_returns_default() {
        let result = generate_forecast(&records(&[0.0; 12]), 5, None);
        assert_eq!(result.model_type, ModelKind::Default);
        assert_eq!(result.accuracy_score, 0.5);
        assert_eq!(result.train_size, 0);
        assert!(result.confidence_upper.is_some());
    }

    #[test]
    fn refund_record_keeps_real_forecast() {
        let mut values = vec![10.0; 20];
        values.push(-500.0);
        let result = explained().generate_forecast(&records(&values), 5, Some(ModelKind::Seasonal));

        assert_eq!(result.model_type, ModelKind::Seasonal);
        assert!(result.train_size > 0);
        assert_eq!(result.forecast_values, vec![10.0; 5]);
        assert!(!matches!(
            result.diagnostics.unwrap().method,
            ForecastMethod::Synthetic
        ));
    }

    #[test]
    fn failed_arima_falls_back_to_moving_average() {
        let config = ForecastConfig {
            min_series_len: 3,
            ..ForecastConfig::default()
        }
        .with_moving_average(MovingAverageConfig::default().with_trend_bounds(0.0, 0.05))
        .with_explain(true);
        let result = DemandForecaster::new(config).generate_forecast(
            &records(&[12.0, 15.0, 11.0, 14.0]),
            6,
            Some(ModelKind::Arima),
        );

        assert_eq!(result.model_type, ModelKind::Arima);
        assert_eq!(result.train_size, 4);
        assert_eq!(result.forecast_values.len(), 6);
        assert!(result.confidence_lower.is_some());
        assert_ne!(result.accuracy_score, SYNTHETIC_ACCURACY);

        let diagnostics = result.diagnostics.unwrap();
        assert_eq!(diagnostics.etl.load.points_added, 0);
        assert!(matches!(
            diagnostics.method,
            ForecastMethod::MovingAverage { .. }
        ));
        assert!(diagnostics.candidates[0].error.is_none());
    }

    #[test]
    fn requesting_default_runs_selection() {
        let result = generate_forecast(&records(&weekly(21)), 4, Some(ModelKind::Default));
        assert_ne!(result.model_type, ModelKind::Default);
    }

    #[test]
    fn cached_forecast_is_reused() {
        let forecaster = DemandForecaster::default();
        let mut cache = ForecastCache::new();
        let input = records(&weekly(21));

        let first =
            forecaster.generate_forecast_cached(&mut cache, &input, 7, Some(ModelKind::Seasonal));
        let second =
            forecaster.generate_forecast_cached(&mut cache, &input, 7, Some(ModelKind::Seasonal));

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);

        forecaster.generate_forecast_cached(&mut cache, &input, 8, Some(ModelKind::Seasonal));
        assert_eq!(cache.len(), 2);
    }
}
