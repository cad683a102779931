//! Daily demand series and chronological train/test splitting.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate};

use crate::core::RawSalesRecord;
use crate::error::{ForecastError, Result};
use crate::utils::stats::{mean, std_dev};

/// Minimum number of points a series must have before it is split.
pub const MIN_SPLIT_POINTS: usize = 10;

/// Minimum number of points left in the training portion of a split.
pub const MIN_TRAIN_POINTS: usize = 7;

/// Ordered `(date, quantity)` pairs, one per calendar day.
///
/// Dates are strictly increasing and values are finite and non-negative.
/// A series fresh out of resampling has no gaps; outlier removal may drop
/// individual days.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series, validating ordering and values.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidParameter(format!(
                "dates must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "quantities must be finite and non-negative, got {v}"
            )));
        }
        Ok(Self { dates, values })
    }

    /// Create a gap-free series starting at `start`.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self::new(dates, values)
    }

    /// Create an empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build without validation; callers guarantee the invariants.
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Daily quantities in date order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// First date, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over `(date, quantity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Sum of all quantities.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Mean quantity (NaN when empty).
    pub fn mean(&self) -> f64 {
        mean(&self.values)
    }

    /// Sample standard deviation (NaN with fewer than two points).
    pub fn std_dev(&self) -> f64 {
        std_dev(&self.values)
    }

    /// stdev / mean; `None` when the mean is not positive or too few points.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        let m = self.mean();
        let s = self.std_dev();
        if m > 0.0 && s.is_finite() {
            Some(s / m)
        } else {
            None
        }
    }

    /// The last `n` points (or the whole series if shorter).
    pub fn tail(&self, n: usize) -> DailySeries {
        let start = self.len().saturating_sub(n);
        self.slice(start, self.len())
    }

    /// Points in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> DailySeries {
        let end = end.min(self.len());
        let start = start.min(end);
        Self::from_parts(
            self.dates[start..end].to_vec(),
            self.values[start..end].to_vec(),
        )
    }

    /// Append a point dated the day after the current last date.
    pub(crate) fn push_next(&mut self, value: f64, fallback_start: NaiveDate) {
        let date = self
            .last_date()
            .map(|d| d + Duration::days(1))
            .unwrap_or(fallback_start);
        self.dates.push(date);
        self.values.push(value);
    }

    /// The `horizon` calendar days following the last observation.
    pub fn future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        match self.last_date() {
            Some(last) => (1..=horizon)
                .map(|h| last + Duration::days(h as i64))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Convert back into one midnight record per day.
    pub fn to_records(&self) -> Vec<RawSalesRecord> {
        self.iter()
            .map(|(date, qty)| RawSalesRecord::on_date(date, qty))
            .collect()
    }

    /// In-process content hash used as a cache key.
    ///
    /// `DefaultHasher` may change between Rust releases, so the value must
    /// not be persisted.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.dates.hash(&mut hasher);
        for v in &self.values {
            v.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Chronological partition of a series into training and held-out parts.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    /// Earlier portion, used for fitting.
    pub train: DailySeries,
    /// Later portion, used for evaluation. Empty for short series.
    pub test: DailySeries,
}

impl TrainTestSplit {
    /// Split with the default limits (10 points to split, 7 kept for training).
    pub fn chronological(series: &DailySeries, test_size: f64) -> Self {
        Self::with_limits(series, test_size, MIN_SPLIT_POINTS, MIN_TRAIN_POINTS)
    }

    /// Split keeping the last `floor(n * test_size)` points for testing.
    ///
    /// Series shorter than `min_split` are not split at all. The split index
    /// never leaves fewer than `min_train` training points when it can help.
    pub fn with_limits(
        series: &DailySeries,
        test_size: f64,
        min_split: usize,
        min_train: usize,
    ) -> Self {
        let n = series.len();
        if n < min_split || n == 0 {
            return Self {
                train: series.clone(),
                test: DailySeries::empty(),
            };
        }

        let test_size = if test_size.is_finite() {
            test_size.clamp(0.0, 0.9)
        } else {
            0.2
        };
        let test_len = (n as f64 * test_size).floor() as usize;
        let mut split_idx = n - test_len;
        if split_idx < min_train {
            split_idx = min_train.min(n - 1);
        }

        Self {
            train: series.slice(0, split_idx),
            test: series.slice(split_idx, n),
        }
    }

    /// Number of training points.
    pub fn train_size(&self) -> usize {
        self.train.len()
    }

    /// Number of held-out points.
    pub fn test_size(&self) -> usize {
        self.test.len()
    }

    /// Whether there is a held-out window to evaluate against.
    pub fn has_test(&self) -> bool {
        !self.test.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series(n: usize) -> DailySeries {
        DailySeries::from_values(start(), (0..n).map(|i| 10.0 + i as f64).collect()).unwrap()
    }

    #[test]
    fn rejects_unordered_dates() {
        let d = start();
        let result = DailySeries::new(vec![d, d], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_negative_values() {
        let result = DailySeries::from_values(start(), vec![1.0, -2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = DailySeries::new(vec![start()], vec![1.0, 2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn statistics_and_accessors() {
        let s = series(5);
        assert_eq!(s.len(), 5);
        assert_relative_eq!(s.total(), 60.0);
        assert_relative_eq!(s.mean(), 12.0);
        assert_eq!(s.last_date(), Some(start() + Duration::days(4)));
        assert_eq!(s.tail(2).values(), &[13.0, 14.0]);
        assert_eq!(s.tail(99).len(), 5);
    }

    #[test]
    fn coefficient_of_variation_of_constant_series_is_zero() {
        let s = DailySeries::from_values(start(), vec![20.0; 30]).unwrap();
        assert_relative_eq!(s.coefficient_of_variation().unwrap(), 0.0);
        assert!(DailySeries::empty().coefficient_of_variation().is_none());
    }

    #[test]
    fn future_dates_follow_last_observation() {
        let s = series(3);
        let future = s.future_dates(2);
        assert_eq!(future, vec![start() + Duration::days(3), start() + Duration::days(4)]);
    }

    #[test]
    fn records_round_trip_dates() {
        let s = series(4);
        let records = s.to_records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].date(), start() + Duration::days(3));
    }

    #[test]
    fn fingerprint_tracks_content() {
        assert_eq!(series(10).fingerprint(), series(10).fingerprint());
        assert_ne!(series(10).fingerprint(), series(11).fingerprint());
    }

    #[test]
    fn split_keeps_twenty_percent_for_test() {
        let s = series(30);
        let split = TrainTestSplit::chronological(&s, 0.2);
        assert_eq!(split.train_size(), 24);
        assert_eq!(split.test_size(), 6);
        assert_eq!(split.train.last_date().unwrap() + Duration::days(1), split.test.first_date().unwrap());
    }

    #[test]
    fn split_skipped_for_short_series() {
        let s = series(9);
        let split = TrainTestSplit::chronological(&s, 0.2);
        assert_eq!(split.train_size(), 9);
        assert!(!split.has_test());
    }

    #[test]
    fn split_clamps_to_minimum_training_length() {
        let s = series(10);
        let split = TrainTestSplit::chronological(&s, 0.5);
        assert_eq!(split.train_size(), 7);
        assert_eq!(split.test_size(), 3);
    }

    #[test]
    fn split_concatenation_restores_series() {
        let s = series(23);
        let split = TrainTestSplit::chronological(&s, 0.2);
        let mut values = split.train.values().to_vec();
        values.extend_from_slice(split.test.values());
        assert_eq!(values, s.values());
    }
}
