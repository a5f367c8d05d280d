//! A collection of time-series bars for a specific symbol and timeframe.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{InvalidBarReason, InvalidInputError},
    models::{bar::Bar, timeframe::TimeFrame},
};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "GC=F", "BTC-USD").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Checks the series against the OHLCV invariants. See [`validate_bars`].
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        validate_bars(&self.bars)
    }
}

/// Checks every bar for finite numbers, `low <= open, close <= high`,
/// non-negative prices and volume, and strictly increasing timestamps.
///
/// The first violation wins; the error carries its index.
pub fn validate_bars(bars: &[Bar]) -> Result<(), InvalidInputError> {
    let fail = |index, reason| Err(InvalidInputError { index, reason });

    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ] {
            if !value.is_finite() {
                return fail(index, InvalidBarReason::NonFinite(field));
            }
        }
        if bar.high < bar.low {
            return fail(
                index,
                InvalidBarReason::HighBelowLow {
                    high: bar.high,
                    low: bar.low,
                },
            );
        }
        for (field, value) in [("open", bar.open), ("close", bar.close)] {
            if value < bar.low || value > bar.high {
                return fail(
                    index,
                    InvalidBarReason::PriceOutOfRange {
                        field,
                        value,
                        low: bar.low,
                        high: bar.high,
                    },
                );
            }
        }
        // low is the smallest price once the range holds
        if bar.low < 0.0 {
            return fail(index, InvalidBarReason::NegativePrice(bar.low));
        }
        if bar.volume < 0.0 {
            return fail(index, InvalidBarReason::NegativeVolume(bar.volume));
        }
        if let Some(prev) = index.checked_sub(1).map(|i| &bars[i]) {
            if bar.timestamp <= prev.timestamp {
                return fail(
                    index,
                    InvalidBarReason::NonIncreasingTimestamp {
                        previous: prev.timestamp,
                        current: bar.timestamp,
                    },
                );
            }
        }
    }
    Ok(())
}
