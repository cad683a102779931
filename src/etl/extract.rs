//! Extract: validate raw records and collect input diagnostics.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::core::RawSalesRecord;

/// Diagnostics gathered while extracting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractReport {
    /// Records accepted.
    pub record_count: usize,
    /// Records dropped for a non-finite quantity.
    pub rejected: usize,
    /// Sum of accepted quantities, before any cleaning.
    pub total_quantity: f64,
    /// Earliest sale date.
    pub first_date: Option<NaiveDate>,
    /// Latest sale date.
    pub last_date: Option<NaiveDate>,
}

/// Accepted records plus their diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<RawSalesRecord>,
    report: ExtractReport,
}

impl RawTable {
    /// Accepted records, in input order.
    pub fn rows(&self) -> &[RawSalesRecord] {
        &self.rows
    }

    /// Extraction diagnostics.
    pub fn report(&self) -> &ExtractReport {
        &self.report
    }

    /// Number of accepted records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no record was accepted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any record sold a positive quantity.
    ///
    /// Negative quantities are clipped during transform, so they cannot
    /// cancel out real demand here.
    pub fn has_demand(&self) -> bool {
        self.rows.iter().any(|r| r.quantity_sold > 0.0)
    }
}

/// Keep every record with a finite quantity and summarise the input.
///
/// Empty input yields an empty table; it never fails.
pub fn extract(records: &[RawSalesRecord]) -> RawTable {
    let mut report = ExtractReport::default();
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        if !record.quantity_sold.is_finite() {
            report.rejected += 1;
            continue;
        }
        let date = record.date();
        report.first_date = Some(report.first_date.map_or(date, |d| d.min(date)));
        report.last_date = Some(report.last_date.map_or(date, |d| d.max(date)));
        report.total_quantity += record.quantity_sold;
        rows.push(*record);
    }
    report.record_count = rows.len();

    debug!(
        records = report.record_count,
        rejected = report.rejected,
        total_quantity = report.total_quantity,
        first_date = ?report.first_date,
        last_date = ?report.last_date,
        "extract complete"
    );

    RawTable { rows, report }
}
