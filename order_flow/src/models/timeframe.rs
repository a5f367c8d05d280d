//! Bar interval descriptor.
//!
//! A [`TimeFrame`] pairs an amount with a [`TimeFrameUnit`]. It parses from and
//! formats to the compact interval codes market data vendors use
//! (`"5m"`, `"1h"`, `"1d"`, `"1wk"`, `"1mo"`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub const fn new(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    pub const fn day() -> Self {
        Self::new(1, TimeFrameUnit::Day)
    }

    /// True for minute and hour bars, whose timestamps carry a time of day.
    pub const fn is_intraday(&self) -> bool {
        matches!(self.unit, TimeFrameUnit::Minute | TimeFrameUnit::Hour)
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self::day()
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "d",
            TimeFrameUnit::Week => "wk",
            TimeFrameUnit::Month => "mo",
        };
        write!(f, "{}{}", self.amount, suffix)
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("missing unit in interval '{s}'"),
            })?;
        let (digits, suffix) = s.split_at(split);
        let amount: u32 = digits.parse().map_err(|_| TimeFrameError::InvalidInput {
            message: format!("missing amount in interval '{s}'"),
        })?;
        let unit = match suffix {
            "m" | "min" => TimeFrameUnit::Minute,
            "h" => TimeFrameUnit::Hour,
            "d" => TimeFrameUnit::Day,
            "wk" | "w" => TimeFrameUnit::Week,
            "mo" => TimeFrameUnit::Month,
            _ => {
                return Err(TimeFrameError::InvalidInput {
                    message: format!("Invalid timeframe unit: {suffix}"),
                });
            }
        };
        if amount == 0 {
            return Err(TimeFrameError::InvalidAmount {
                unit,
                message: "amount must be greater than zero".into(),
            });
        }
        Ok(Self::new(amount, unit))
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = TimeFrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(tf: TimeFrame) -> Self {
        tf.to_string()
    }
}
