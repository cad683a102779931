//! Seasonal-naive forecaster with a weekly pattern.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastMethod, Forecaster, PatternSource};
use crate::utils::stats::mean;

/// Days in the weekly pattern.
pub const WEEK: usize = 7;

/// Points needed for the day-of-week pattern.
pub const MIN_DAY_OF_WEEK_POINTS: usize = 2 * WEEK;

/// Repeats a weekly pattern learned from history.
///
/// - At least 14 points: mean demand per weekday, looked up by the
///   weekday of each forecast date.
/// - 7 to 13 points: the last seven values, repeated in order.
/// - Fewer: the last value, repeated.
#[derive(Debug, Clone, Default)]
pub struct SeasonalNaive {
    pattern: Vec<f64>,
    source: Option<PatternSource>,
    last_date: Option<NaiveDate>,
}

impl SeasonalNaive {
    /// Create a new seasonal-naive model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned pattern. Indexed by weekday (Monday = 0) for
    /// [`PatternSource::DayOfWeek`], by step otherwise.
    pub fn pattern(&self) -> &[f64] {
        &self.pattern
    }

    /// Which rule produced the pattern.
    pub fn source(&self) -> Option<PatternSource> {
        self.source
    }

    fn day_of_week_pattern(series: &DailySeries) -> Vec<f64> {
        let mut sums = [0.0; WEEK];
        let mut counts = [0usize; WEEK];
        for (date, value) in series.iter() {
            let slot = date.weekday().num_days_from_monday() as usize;
            sums[slot] += value;
            counts[slot] += 1;
        }
        // Gaps left by outlier removal can empty a slot.
        let overall = series.mean();
        sums.iter()
            .zip(counts.iter())
            .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { overall })
            .collect()
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let values = series.values();
        let (source, pattern) = match values.len() {
            0 => return Err(ForecastError::InsufficientHistory { needed: 1, got: 0 }),
            n if n >= MIN_DAY_OF_WEEK_POINTS => {
                (PatternSource::DayOfWeek, Self::day_of_week_pattern(series))
            }
            n if n >= WEEK => (PatternSource::LastWeek, values[n - WEEK..].to_vec()),
            n => (PatternSource::LastValue, vec![values[n - 1]]),
        };

        debug!(?source, mean = mean(&pattern), "seasonal pattern fitted");
        self.pattern = pattern;
        self.source = Some(source);
        self.last_date = series.last_date();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let source = self.source.ok_or(ForecastError::FitRequired)?;
        let values = match (source, self.last_date) {
            (PatternSource::DayOfWeek, Some(last)) => (1..=horizon)
                .map(|h| {
                    let date = last + Duration::days(h as i64);
                    self.pattern[date.weekday().num_days_from_monday() as usize]
                })
                .collect(),
            _ => (0..horizon)
                .map(|h| self.pattern[h % self.pattern.len()])
                .collect(),
        };
        Ok(Forecast::from_values(values))
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }

    fn is_fitted(&self) -> bool {
        self.source.is_some()
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::SeasonalPattern {
            source: self.source.unwrap_or(PatternSource::LastValue),
            pattern: self.pattern.clone(),
        }
    }
}
