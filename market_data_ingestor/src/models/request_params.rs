use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::timeframe::TimeFrame;

/// Universal parameters for requesting one symbol's bar history from a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Vendor symbol (e.g., `"GC=F"`, `"EURUSD=X"`, `"^GSPC"`, `"BTC-USD"`).
    pub symbol: String,

    /// How far back from now to download, e.g. 60 days.
    pub period: Lookback,

    /// The time interval for each bar (e.g., 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub interval: TimeFrame,
}

impl BarsRequestParams {
    pub fn new(symbol: impl Into<String>, period: Lookback, interval: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            interval,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid lookback period '{input}': {message}")]
pub struct LookbackError {
    pub input: String,
    pub message: String,
}

/// A download period relative to now, in the vendor's range vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Days(60)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{n}d"),
            Lookback::Months(n) => write!(f, "{n}mo"),
            Lookback::Years(n) => write!(f, "{n}y"),
            Lookback::YearToDate => f.write_str("ytd"),
            Lookback::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Lookback {
    type Err = LookbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = |message: &str| LookbackError {
            input: s.to_string(),
            message: message.to_string(),
        };

        match s.to_lowercase().as_str() {
            "ytd" => return Ok(Lookback::YearToDate),
            "max" => return Ok(Lookback::Max),
            _ => {}
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| err("missing unit"))?;
        let (digits, unit) = s.split_at(split);
        let amount: u32 = digits.parse().map_err(|_| err("missing amount"))?;
        if amount == 0 {
            return Err(err("amount must be greater than zero"));
        }
        match unit {
            "d" => Ok(Lookback::Days(amount)),
            "mo" => Ok(Lookback::Months(amount)),
            "y" => Ok(Lookback::Years(amount)),
            _ => Err(err("unit must be one of d, mo, y")),
        }
    }
}

impl TryFrom<String> for Lookback {
    type Error = LookbackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vendor_ranges() {
        assert_eq!("60d".parse::<Lookback>().unwrap(), Lookback::Days(60));
        assert_eq!("6mo".parse::<Lookback>().unwrap(), Lookback::Months(6));
        assert_eq!("2y".parse::<Lookback>().unwrap(), Lookback::Years(2));
        assert_eq!("YTD".parse::<Lookback>().unwrap(), Lookback::YearToDate);
        assert_eq!("max".parse::<Lookback>().unwrap(), Lookback::Max);

        assert!("0d".parse::<Lookback>().is_err());
        assert!("60".parse::<Lookback>().is_err());
        assert!("3w".parse::<Lookback>().is_err());
    }

    #[test]
    fn round_trips_through_display() {
        for raw in ["60d", "1mo", "10y", "ytd", "max"] {
            assert_eq!(raw.parse::<Lookback>().unwrap().to_string(), raw);
        }
    }
}
