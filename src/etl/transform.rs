//! Transform: turn accepted records into a clean daily series.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::core::DailySeries;
use crate::etl::{EtlConfig, RawTable};
use crate::utils::stats::{mean, std_dev};

/// Diagnostics gathered while transforming.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    /// Points in the cleaned series.
    pub points: usize,
    /// Sum of the cleaned series.
    pub total_quantity: f64,
    /// Days dropped as outliers.
    pub outliers_removed: usize,
    /// Negative values clipped to zero.
    pub clipped: usize,
    /// Missing values filled.
    pub missing_filled: usize,
    /// Mean of the cleaned series.
    pub mean: f64,
    /// Sample standard deviation of the cleaned series.
    pub std_dev: f64,
}

/// Resample to one value per calendar day and clean it.
///
/// Steps, in order: sum quantities per date over the full date range (days
/// without sales get zero), drop points outside `mean ± sigma * stdev`
/// when the series is long enough, clip negatives to zero, then fill any
/// remaining gaps forward, backward, and finally with zero.
pub fn transform(table: &RawTable, config: &EtlConfig) -> (DailySeries, TransformReport) {
    let mut report = TransformReport::default();

    let (dates, values) = resample_daily(table);
    let (dates, mut values) = remove_outliers(dates, values, config, &mut report);

    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
            report.clipped += 1;
        }
    }

    report.missing_filled = fill_missing(&mut values);

    report.points = values.len();
    report.total_quantity = values.iter().sum();
    report.mean = if values.is_empty() { 0.0 } else { mean(&values) };
    report.std_dev = if values.len() < 2 { 0.0 } else { std_dev(&values) };

    debug!(
        points = report.points,
        total_quantity = report.total_quantity,
        outliers_removed = report.outliers_removed,
        clipped = report.clipped,
        missing_filled = report.missing_filled,
        mean = report.mean,
        std_dev = report.std_dev,
        "transform complete"
    );

    (DailySeries::from_parts(dates, values), report)
}

/// Sum per calendar day between the first and last sale, zero-filled.
fn resample_daily(table: &RawTable) -> (Vec<NaiveDate>, Vec<f64>) {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in table.rows() {
        *per_day.entry(record.date()).or_insert(0.0) += record.quantity_sold;
    }

    let (first, last) = match (per_day.keys().next(), per_day.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return (Vec::new(), Vec::new()),
    };

    let days = (last - first).num_days() as usize + 1;
    let mut dates = Vec::with_capacity(days);
    let mut values = Vec::with_capacity(days);
    for offset in 0..days {
        let date = first + Duration::days(offset as i64);
        dates.push(date);
        values.push(per_day.get(&date).copied().unwrap_or(0.0));
    }
    (dates, values)
}

fn remove_outliers(
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    config: &EtlConfig,
    report: &mut TransformReport,
) -> (Vec<NaiveDate>, Vec<f64>) {
    if values.len() <= config.outlier_min_len {
        return (dates, values);
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let m = mean(&finite);
    let s = std_dev(&finite);
    if !m.is_finite() || !s.is_finite() || s == 0.0 {
        return (dates, values);
    }

    let low = m - config.outlier_sigma * s;
    let high = m + config.outlier_sigma * s;
    let before = values.len();
    let (dates, values): (Vec<_>, Vec<_>) = dates
        .into_iter()
        .zip(values)
        .filter(|(_, v)| !v.is_finite() || (*v >= low && *v <= high))
        .unzip();
    report.outliers_removed = before - values.len();
    (dates, values)
}

/// Forward-fill, then back-fill, then zero-fill non-finite values.
fn fill_missing(values: &mut [f64]) -> usize {
    let missing = values.iter().filter(|v| !v.is_finite()).count();
    if missing == 0 {
        return 0;
    }

    let mut last = None;
    for v in values.iter_mut() {
        if v.is_finite() {
            last = Some(*v);
        } else if let Some(prev) = last {
            *v = prev;
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        if v.is_finite() {
            next = Some(*v);
        } else if let Some(following) = next {
            *v = following;
        }
    }
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = 0.0;
    }
    missing
}
