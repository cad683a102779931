//! Load: guarantee the minimum series length every trainer relies on.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::core::DailySeries;
use crate::etl::EtlConfig;

/// Diagnostics gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Whether synthetic points were appended.
    pub padded: bool,
    /// Number of synthetic points appended.
    pub points_added: usize,
    /// Value used for the synthetic points.
    pub pad_value: Option<f64>,
    /// Series length after loading.
    pub final_len: usize,
}

/// Pad short series up to `config.min_points`.
///
/// Synthetic points equal the series mean (or `config.pad_default` for an
/// empty series) and are dated on the days following the last observation.
/// An empty series is padded from 1970-01-01 so the output never depends
/// on the clock.
pub fn load(mut series: DailySeries, config: &EtlConfig) -> (DailySeries, LoadReport) {
    let mut report = LoadReport::default();
    let missing = config.min_points.saturating_sub(series.len());

    if missing > 0 {
        let pad_value = if series.is_empty() {
            config.pad_default
        } else {
            series.mean()
        };
        for _ in 0..missing {
            series.push_next(pad_value, NaiveDate::default());
        }
        report.padded = true;
        report.points_added = missing;
        report.pad_value = Some(pad_value);
    }
    report.final_len = series.len();

    debug!(
        padded = report.padded,
        points_added = report.points_added,
        final_len = report.final_len,
        "load complete"
    );

    (series, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn pads_short_series_with_mean() {
        let series = DailySeries::from_values(start(), vec![10.0, 20.0, 30.0]).unwrap();
        let (loaded, report) = load(series, &EtlConfig::default());

        assert_eq!(loaded.len(), 7);
        assert!(report.padded);
        assert_eq!(report.points_added, 4);
        assert_relative_eq!(loaded.values()[6], 20.0);
        assert_eq!(loaded.last_date(), Some(start() + Duration::days(6)));
    }

    #[test]
    fn pads_empty_series_with_default() {
        let (loaded, report) = load(DailySeries::empty(), &EtlConfig::default());

        assert_eq!(loaded.len(), 7);
        assert_eq!(report.pad_value, Some(20.0));
        assert!(loaded.values().iter().all(|v| *v == 20.0));
        assert_eq!(loaded.dates()[0], NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

        let (again, _) = load(DailySeries::empty(), &EtlConfig::default());
        assert_eq!(loaded, again);
    }

    #[test]
    fn leaves_long_series_alone() {
        let series = DailySeries::from_values(start(), vec![5.0; 12]).unwrap();
        let (loaded, report) = load(series.clone(), &EtlConfig::default());

        assert_eq!(loaded, series);
        assert!(!report.padded);
        assert_eq!(report.final_len, 12);
    }
}
