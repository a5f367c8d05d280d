//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is the standard output of every market data provider and the
//! only input type the detector understands.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The timestamp for this bar (UTC). Accepts RFC 3339 or a plain `YYYY-MM-DD` date.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

fn deserialize_timestamp<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
        return Ok(ts.with_timezone(&Utc));
    }
    // A leading date, anything after it is ignored.
    NaiveDate::parse_and_remainder(&s, "%Y-%m-%d")
        .ok()
        .and_then(|(date, _)| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {s}")))
}
