//! Error types for the demand-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while training or projecting a model.
///
/// None of these escape the public pipeline entry points: each one is
/// recovered locally by skipping the model or falling back to a simpler
/// forecaster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// No records, or records whose quantities sum to zero.
    #[error("no usable sales data")]
    NoData,

    /// Fewer points than the model needs.
    #[error("insufficient history: need at least {needed}, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Near-constant series (coefficient of variation below threshold).
    #[error("degenerate series: coefficient of variation {cv:.6}")]
    DegenerateSeries { cv: f64 },

    /// Model-specific numerical failure (non-convergence, singular fit).
    #[error("fit failure: {0}")]
    FitFailure(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,
}

impl ForecastError {
    /// Whether the error means the model never saw enough usable data.
    pub fn is_data_shortage(&self) -> bool {
        matches!(
            self,
            ForecastError::NoData | ForecastError::InsufficientHistory { .. }
        )
    }
}
