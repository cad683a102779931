//! # demand-forecast
//!
//! Daily demand forecasting from raw sales transactions.
//!
//! Records go through an extract/transform/load pipeline into a clean
//! daily series, which is split chronologically for evaluation. ARIMA
//! (grid-searched by AIC), a random forest on lag features and a
//! seasonal-naive model are trained, scored on the held-out window and
//! compared; the best one (with a preference for ARIMA when scores are
//! close) produces the forecast and its confidence bands. Every failure
//! degrades to a simpler forecaster or a synthetic placeholder, so the
//! entry points never return an error.
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use demand_forecast::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let records: Vec<_> = (0..60)
//!     .map(|i| RawSalesRecord::on_date(start + Duration::days(i), 40.0 + (i % 7) as f64 * 3.0))
//!     .collect();
//!
//! let result = generate_forecast(&records, 14, None);
//! assert_eq!(result.forecast_values.len(), 14);
//! assert!(result.forecast_values.iter().all(|v| *v >= 0.0));
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod cache;
pub mod core;
pub mod error;
pub mod etl;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod utils;

pub use error::{ForecastError, Result};
pub use pipeline::{generate_forecast, DemandForecaster, ForecastConfig};
pub use utils::metrics::{evaluate, EvaluationMetrics};

pub mod prelude {
    pub use crate::core::{DailySeries, Forecast, ForecastResult, ModelKind, RawSalesRecord};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::Forecaster;
    pub use crate::pipeline::{generate_forecast, DemandForecaster, ForecastConfig};
    pub use crate::utils::{evaluate, EvaluationMetrics};
}
