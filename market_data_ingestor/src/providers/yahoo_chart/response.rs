use std::fmt;

use chrono::{DateTime, Duration, Utc};
use order_flow::{Bar, TimeFrame};
use serde::Deserialize;

use crate::providers::{ApiSnafu, InternalSnafu, ProviderError, ValidationSnafu};

#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    pub gmtoffset: Option<i64>,
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLCV arrays. Entries are `null` where the vendor has no print.
#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Bars decoded from a chart response.
#[derive(Debug)]
pub struct DecodedBars {
    pub bars: Vec<Bar>,
    /// Rows skipped because a field was null or the timestamp did not advance.
    pub dropped: usize,
}

impl ChartResponse {
    /// Unwraps the first result, mapping the vendor's error object to [`ProviderError::Api`].
    pub fn into_result(self) -> Result<ChartResult, ProviderError> {
        if let Some(err) = self.chart.error {
            return ApiSnafu {
                message: err.to_string(),
            }
            .fail();
        }
        match self.chart.result.and_then(|r| r.into_iter().next()) {
            Some(result) => Ok(result),
            None => ValidationSnafu {
                message: "chart response contained no result",
            }
            .fail(),
        }
    }
}

impl ChartResult {
    /// Converts the column arrays into bars, oldest first.
    ///
    /// Rows with any null field are dropped. For day-or-longer intervals the
    /// timestamp is moved to midnight UTC of the exchange-local trading date;
    /// when two rows land on the same instant the later row wins.
    pub fn into_bars(self, interval: &TimeFrame) -> Result<DecodedBars, ProviderError> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let n = self.timestamp.len();
        let columns = [
            ("open", quote.open.len()),
            ("high", quote.high.len()),
            ("low", quote.low.len()),
            ("close", quote.close.len()),
            ("volume", quote.volume.len()),
        ];
        if let Some((name, len)) = columns.iter().find(|(_, len)| *len != n) {
            return InternalSnafu {
                message: format!("{name} has {len} entries but there are {n} timestamps"),
            }
            .fail();
        }

        let offset = self.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let mut bars: Vec<Bar> = Vec::with_capacity(n);
        let mut dropped = 0;

        for i in 0..n {
            let row = (
                quote.open[i],
                quote.high[i],
                quote.low[i],
                quote.close[i],
                quote.volume[i],
            );
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
                dropped += 1;
                continue;
            };
            let Some(timestamp) = bar_timestamp(self.timestamp[i], offset, interval) else {
                dropped += 1;
                continue;
            };
            let bar = Bar::new(timestamp, open, high, low, close, volume);

            match bars.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => {
                    *prev = bar;
                    dropped += 1;
                }
                Some(prev) if prev.timestamp > bar.timestamp => dropped += 1,
                _ => bars.push(bar),
            }
        }

        Ok(DecodedBars { bars, dropped })
    }
}

fn bar_timestamp(epoch_secs: i64, gmtoffset: i64, interval: &TimeFrame) -> Option<DateTime<Utc>> {
    let ts = DateTime::from_timestamp(epoch_secs, 0)?;
    if interval.is_intraday() {
        return Some(ts);
    }
    let local = ts + Duration::seconds(gmtoffset);
    local.date_naive().and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "GC=F", "currency": "USD", "gmtoffset": -14400, "exchangeTimezoneName": "America/New_York"},
                "timestamp": [1704171600, 1704258000, 1704344400, 1704430800],
                "indicators": {"quote": [{
                    "open":   [2072.0, 2050.0, null,   2045.0],
                    "high":   [2080.0, 2055.0, 2049.0, 2050.0],
                    "low":    [2060.0, 2030.0, 2035.0, 2040.0],
                    "close":  [2064.4, 2034.2, 2042.3, 2049.0],
                    "volume": [1234,   2345,   3456,   4567]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn decodes_and_drops_null_rows() {
        let response: ChartResponse = serde_json::from_str(BODY).unwrap();
        let decoded = response.into_result().unwrap().into_bars(&TimeFrame::day()).unwrap();

        assert_eq!(decoded.dropped, 1);
        assert_eq!(decoded.bars.len(), 3);
        // 2024-01-02T05:00:00Z is 2024-01-02 01:00 in New York.
        assert_eq!(
            decoded.bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(decoded.bars[1].volume, 2345.0);
        assert_eq!(decoded.bars[2].close, 2049.0);
    }

    #[test]
    fn intraday_keeps_raw_timestamps() {
        let response: ChartResponse = serde_json::from_str(BODY).unwrap();
        let tf: TimeFrame = "60m".parse().unwrap();
        let decoded = response.into_result().unwrap().into_bars(&tf).unwrap();
        assert_eq!(decoded.bars[0].timestamp.timestamp(), 1704171600);
    }

    #[test]
    fn same_day_rows_collapse_to_latest() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704171600,1704200000],
            "indicators":{"quote":[{"open":[1.0,2.0],"high":[1.0,2.0],"low":[1.0,2.0],"close":[1.0,2.0],"volume":[1,2]}]}}],"error":null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let decoded = response.into_result().unwrap().into_bars(&TimeFrame::day()).unwrap();
        assert_eq!(decoded.bars.len(), 1);
        assert_eq!(decoded.bars[0].close, 2.0);
        assert_eq!(decoded.dropped, 1);
    }

    #[test]
    fn vendor_error_becomes_api_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error: Not Found: No data found, symbol may be delisted"
        );
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let body = r#"{"chart":{"result":[{"timestamp":[1,2],
            "indicators":{"quote":[{"open":[1.0],"high":[1.0,2.0],"low":[1.0,2.0],"close":[1.0,2.0],"volume":[1,2]}]}}],"error":null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let err = response.into_result().unwrap().into_bars(&TimeFrame::day()).unwrap_err();
        assert!(matches!(err, ProviderError::Internal { .. }));
    }
}
