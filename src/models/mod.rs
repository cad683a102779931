//! Forecasting models.
//!
//! Each trainer turns a [`DailySeries`](crate::core::DailySeries) into a
//! [`TrainedModel`] tagged with the [`ModelKind`](crate::core::ModelKind)
//! it was requested as.

mod traits;

pub mod arima;
pub mod forest;
pub mod moving_average;
pub mod seasonal;
pub mod synthetic;

pub use arima::{train_arima, ARIMAGrid, ARIMAGridConfig, ARIMASpec, ARIMA};
pub use forest::{ForestConfig, RandomForest};
pub use moving_average::{MovingAverage, MovingAverageConfig};
pub use seasonal::SeasonalNaive;
pub use synthetic::{default_forecast, SyntheticConfig, SYNTHETIC_ACCURACY};
pub use traits::{
    BoxedForecaster, ForecastMethod, Forecaster, PatternSource, Projection, TrainedModel,
};

use crate::core::{DailySeries, ModelKind};
use crate::error::Result;

/// Train the random forest.
pub fn train_forest(series: &DailySeries, config: &ForestConfig) -> Result<TrainedModel> {
    let mut model = RandomForest::new(config.clone());
    model.fit(series)?;
    Ok(TrainedModel::new(ModelKind::RandomForest, Box::new(model), series))
}

/// Train the seasonal-naive model.
pub fn train_seasonal(series: &DailySeries) -> Result<TrainedModel> {
    let mut model = SeasonalNaive::new();
    model.fit(series)?;
    Ok(TrainedModel::new(ModelKind::Seasonal, Box::new(model), series))
}
