//! Core data structures: input records, daily series, forecasts and results.

mod forecast;
pub mod interval;
mod record;
mod result;
mod series;

pub use forecast::Forecast;
pub use record::{parse_timestamp, RawSalesRecord};
pub use result::{CandidateScore, ForecastDiagnostics, ForecastResult, ModelKind};
pub use series::{DailySeries, TrainTestSplit, MIN_SPLIT_POINTS, MIN_TRAIN_POINTS};
