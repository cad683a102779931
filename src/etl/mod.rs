//! ETL pipeline: raw sales records to a clean, minimum-length daily series.
//!
//! Cleaning happens once here so every trainer sees identical input.

mod extract;
mod load;
mod transform;

pub use extract::{extract, ExtractReport, RawTable};
pub use load::{load, LoadReport};
pub use transform::{transform, TransformReport};

use serde::Serialize;

use crate::core::{DailySeries, RawSalesRecord};
use crate::error::{ForecastError, Result};

/// ETL tuning knobs.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    /// Points beyond `mean ± outlier_sigma * stdev` are dropped.
    pub outlier_sigma: f64,
    /// Outlier removal only runs on series longer than this.
    pub outlier_min_len: usize,
    /// Series shorter than this are padded.
    pub min_points: usize,
    /// Pad value for an empty series.
    pub pad_default: f64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: 3.0,
            outlier_min_len: 10,
            min_points: 7,
            pad_default: 20.0,
        }
    }
}

impl EtlConfig {
    /// Set the outlier threshold in standard deviations.
    pub fn with_outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = sigma;
        self
    }

    /// Set the minimum series length guaranteed by padding.
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }
}

/// Per-stage diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EtlReport {
    pub extract: ExtractReport,
    pub transform: TransformReport,
    pub load: LoadReport,
}

/// Output of a full ETL run.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlOutput {
    /// Cleaned and padded series (empty when there was no input).
    pub series: DailySeries,
    /// What each stage did.
    pub report: EtlReport,
}

impl EtlOutput {
    /// The series, or `NoData` when there was nothing to forecast from
    /// (no records, or a cleaned series summing to zero).
    pub fn require_data(&self) -> Result<&DailySeries> {
        if self.series.is_empty() || self.report.transform.total_quantity <= 0.0 {
            return Err(ForecastError::NoData);
        }
        Ok(&self.series)
    }
}

/// Run extract, transform and load.
///
/// Input without positive sales stops after extract, and a cleaned series
/// summing to zero stops after transform. Both leave an empty series.
pub fn run_etl(records: &[RawSalesRecord], config: &EtlConfig) -> EtlOutput {
    let table = extract(records);
    let mut report = EtlReport {
        extract: table.report().clone(),
        ..Default::default()
    };
    if !table.has_demand() {
        return EtlOutput {
            series: DailySeries::empty(),
            report,
        };
    }

    let (series, transform_report) = transform(&table, config);
    report.transform = transform_report;
    if report.transform.total_quantity <= 0.0 {
        return EtlOutput {
            series: DailySeries::empty(),
            report,
        };
    }

    let (series, load_report) = load(series, config);
    report.load = load_report;

    EtlOutput { series, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn full_run_produces_padded_series() {
        let records = vec![
            RawSalesRecord::on_date(day(1), 4.0),
            RawSalesRecord::on_date(day(3), 8.0),
        ];
        let out = run_etl(&records, &EtlConfig::default());

        assert_eq!(out.report.transform.points, 3);
        assert_eq!(out.report.load.points_added, 4);
        assert_eq!(out.series.len(), 7);
        assert!(out.require_data().is_ok());
    }

    #[test]
    fn empty_input_is_no_data() {
        let out = run_etl(&[], &EtlConfig::default());
        assert!(out.series.is_empty());
        assert_eq!(out.require_data(), Err(ForecastError::NoData));
    }

    #[test]
    fn zero_demand_is_no_data() {
        let records = vec![
            RawSalesRecord::on_date(day(1), 0.0),
            RawSalesRecord::on_date(day(2), 0.0),
        ];
        let out = run_etl(&records, &EtlConfig::default());
        assert_eq!(out.report.extract.record_count, 2);
        assert!(matches!(out.require_data(), Err(ForecastError::NoData)));
    }

    #[test]
    fn refund_does_not_cancel_real_demand() {
        let mut records: Vec<_> = (1..=20).map(|d| RawSalesRecord::on_date(day(d), 10.0)).collect();
        records.push(RawSalesRecord::on_date(day(21), -500.0));
        let out = run_etl(&records, &EtlConfig::default());

        assert!(out.report.extract.total_quantity < 0.0);
        assert!(out.report.transform.total_quantity > 0.0);
        let series = out.require_data().unwrap();
        assert!(series.values().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn negative_only_demand_is_no_data() {
        let records = vec![
            RawSalesRecord::on_date(day(1), 5.0),
            RawSalesRecord::on_date(day(1), -8.0),
        ];
        let out = run_etl(&records, &EtlConfig::default());
        assert_eq!(out.report.transform.clipped, 1);
        assert!(out.series.is_empty());
        assert_eq!(out.require_data(), Err(ForecastError::NoData));
    }

    #[test]
    fn config_builders_reach_the_stages() {
        let config = EtlConfig::default().with_outlier_sigma(1.0).with_min_points(12);
        let mut records: Vec<_> = (1..=11).map(|d| RawSalesRecord::on_date(day(d), 10.0)).collect();
        records.push(RawSalesRecord::on_date(day(12), 14.0));
        let out = run_etl(&records, &config);

        // 14.0 lies beyond one standard deviation and is dropped.
        assert_eq!(out.report.transform.outliers_removed, 1);
        assert_eq!(out.report.load.points_added, 1);
        assert_eq!(out.series.len(), 12);
    }
}
