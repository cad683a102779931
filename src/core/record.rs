//! Raw per-transaction sales input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

/// One individual sale line as supplied by the caller.
///
/// Records may arrive in any order, at irregular timestamps, and with
/// several sales on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRecord {
    /// When the sale happened. Accepts `transaction_date` as an alias and
    /// either a full datetime or a plain `YYYY-MM-DD` date.
    #[serde(alias = "transaction_date", deserialize_with = "deserialize_timestamp")]
    pub transaction_timestamp: NaiveDateTime,
    /// Quantity sold (kg). Negative values are data errors and get clipped.
    pub quantity_sold: f64,
}

impl RawSalesRecord {
    /// Create a record from a timestamp and a quantity.
    pub fn new(transaction_timestamp: NaiveDateTime, quantity_sold: f64) -> Self {
        Self {
            transaction_timestamp,
            quantity_sold,
        }
    }

    /// Create a record stamped at midnight of `date`.
    pub fn on_date(date: NaiveDate, quantity_sold: f64) -> Self {
        Self::new(date.and_time(NaiveTime::default()), quantity_sold)
    }

    /// Calendar date of the sale.
    pub fn date(&self) -> NaiveDate {
        self.transaction_timestamp.date()
    }
}

/// Parse the timestamp formats the sales store emits.
///
/// Tries ISO datetime (`T` or space separated, optional fraction), RFC 3339
/// with offset (converted to UTC), then a bare date at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::default()))
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp: {raw}")))
}
