//! Statistics, accuracy metrics and numerical optimisation helpers.

pub mod metrics;
pub mod optimization;
pub mod stats;

pub use metrics::{evaluate, heuristic_accuracy, EvaluationMetrics};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{linear_slope, mean, std_dev, variance, z_score};
