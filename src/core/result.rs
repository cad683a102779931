//! Forecast output contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::etl::EtlReport;
use crate::models::ForecastMethod;
use crate::utils::metrics::EvaluationMetrics;

/// Which model a forecast was requested as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "ARIMA")]
    Arima,
    #[serde(rename = "RF")]
    RandomForest,
    #[serde(rename = "SEASONAL")]
    Seasonal,
    /// No model could be trained and none was requested.
    #[serde(rename = "Default")]
    Default,
}

impl ModelKind {
    /// Trainable kinds in selection order.
    pub const TRAINABLE: [ModelKind; 3] =
        [ModelKind::Arima, ModelKind::RandomForest, ModelKind::Seasonal];

    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Arima => "ARIMA",
            ModelKind::RandomForest => "RF",
            ModelKind::Seasonal => "SEASONAL",
            ModelKind::Default => "Default",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arima" => Ok(ModelKind::Arima),
            "rf" | "random_forest" | "randomforest" => Ok(ModelKind::RandomForest),
            "seasonal" | "seasonal_naive" => Ok(ModelKind::Seasonal),
            "default" => Ok(ModelKind::Default),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown model type '{other}'"
            ))),
        }
    }
}

/// Score of one model considered during selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub model: ModelKind,
    /// Held-out (or heuristic) accuracy; `None` if the model failed.
    pub accuracy: Option<f64>,
    /// Why the model failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Optional explanation of how a result was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDiagnostics {
    /// What each ETL stage did.
    pub etl: EtlReport,
    /// How the returned values were generated.
    pub method: ForecastMethod,
    /// Every model considered, in selection order.
    pub candidates: Vec<CandidateScore>,
    /// Mean daily demand of the loaded series.
    pub avg_daily_demand: Option<f64>,
    /// Last loaded observation.
    pub last_value: Option<f64>,
}

/// Forecast returned to callers.
///
/// Values are non-negative. When bands are present they have the same
/// length as the values and satisfy `0 <= lower <= value <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub forecast_values: Vec<f64>,
    pub confidence_lower: Option<Vec<f64>>,
    pub confidence_upper: Option<Vec<f64>>,
    pub model_type: ModelKind,
    pub accuracy_score: f64,
    pub metrics: EvaluationMetrics,
    pub train_size: usize,
    pub test_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<ForecastDiagnostics>,
}

impl ForecastResult {
    /// Forecast horizon.
    pub fn horizon(&self) -> usize {
        self.forecast_values.len()
    }

    /// Whether both confidence bands are present.
    pub fn has_intervals(&self) -> bool {
        self.confidence_lower.is_some() && self.confidence_upper.is_some()
    }

    /// Serialize to the JSON output contract.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
