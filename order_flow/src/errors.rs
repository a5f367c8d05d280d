use chrono::{DateTime, Utc};
use thiserror::Error;

/// A bar in the input series violates the OHLCV invariants.
///
/// Raised before any statistic is computed; the detector never recovers from it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid bar at index {index}: {reason}")]
pub struct InvalidInputError {
    /// Position of the offending bar in the input slice.
    pub index: usize,
    /// Which invariant was broken.
    pub reason: InvalidBarReason,
}

/// The specific invariant a bar broke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidBarReason {
    #[error("high {high} is below low {low}")]
    HighBelowLow { high: f64, low: f64 },

    #[error("{field} {value} lies outside [{low}, {high}]")]
    PriceOutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("low {0} is negative")]
    NegativePrice(f64),

    #[error("volume {0} is negative")]
    NegativeVolume(f64),

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),

    #[error("timestamp {current} does not come after {previous}")]
    NonIncreasingTimestamp {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// Errors raised while building a [`DetectorConfig`](crate::detector::DetectorConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorConfigError {
    #[error("window must be a positive integer")]
    ZeroWindow,

    #[error("volume multiplier must be a positive finite number, got {0}")]
    InvalidVolumeMultiplier(f64),
}
