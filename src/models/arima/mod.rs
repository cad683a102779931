//! ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - ARIMA models with a fixed (p, d, q) specification
//! - A grid search over small orders selecting by AIC
//! - The ARIMA trainer with its moving-average fallbacks

mod diff;
mod grid;
mod model;

pub use diff::{difference, integrate};
pub use grid::{train_arima, train_moving_average, ARIMAGrid, ARIMAGridConfig, MIN_ARIMA_POINTS};
pub use model::{ARIMASpec, ARIMA};
