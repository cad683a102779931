//! Placeholder demand curve returned when no real model can be built.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::core::Forecast;

/// Accuracy reported for a synthetic forecast.
pub const SYNTHETIC_ACCURACY: f64 = 0.5;

/// Shape of the synthetic curve.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Demand on day zero before weighting.
    pub base_demand: f64,
    /// Multiplier for the first five days of each week.
    pub weekday_factor: f64,
    /// Multiplier for the last two days of each week.
    pub weekend_factor: f64,
    /// Growth per day (0.005 = 0.5%).
    pub daily_growth: f64,
    /// Standard deviation of the multiplicative noise around 1.
    pub noise_sd: f64,
    /// Lower band as a fraction of the value.
    pub band_low: f64,
    /// Upper band as a fraction of the value.
    pub band_high: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base_demand: 50.0,
            weekday_factor: 1.1,
            weekend_factor: 0.8,
            daily_growth: 0.005,
            noise_sd: 0.1,
            band_low: 0.7,
            band_high: 1.3,
        }
    }
}

impl SyntheticConfig {
    /// Set the base demand.
    pub fn with_base_demand(mut self, base_demand: f64) -> Self {
        self.base_demand = base_demand;
        self
    }
}

/// Multiplicative noise for day `day`, seeded by the day index alone.
fn noise(day: usize, sd: f64) -> f64 {
    let mut rng = StdRng::seed_from_u64(day as u64);
    match Normal::new(1.0, sd) {
        Ok(dist) => dist.sample(&mut rng),
        Err(_) => 1.0,
    }
}

/// Weekday-weighted curve with a small upward trend and seeded noise.
///
/// `value[i] = base * weight(i) * (1 + growth * i) * noise(i)`, where
/// `weight` favours the first five days of every seven. Bands are fixed
/// fractions of the value. Output is identical across calls.
pub fn default_forecast(periods: usize, config: &SyntheticConfig) -> Forecast {
    let mut values = Vec::with_capacity(periods);
    let mut lower = Vec::with_capacity(periods);
    let mut upper = Vec::with_capacity(periods);

    for i in 0..periods {
        let weight = if i % 7 < 5 {
            config.weekday_factor
        } else {
            config.weekend_factor
        };
        let trend = 1.0 + config.daily_growth * i as f64;
        let value = (config.base_demand * weight * trend * noise(i, config.noise_sd)).max(0.0);
        values.push(value);
        lower.push((value * config.band_low).max(0.0));
        upper.push((value * config.band_high).max(value));
    }

    Forecast::from_values_with_intervals(values, lower, upper)
}
