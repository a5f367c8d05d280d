//! Lightweight-Charts candlestick payload.
//!
//! The JSON written here can be handed straight to
//! `LightweightCharts.createChart(el, options).addCandlestickSeries()` in a
//! browser: `series[0].data` goes to `setData`, `series[0].markers` to
//! `setMarkers`. Daily and longer bars are keyed by a `YYYY-MM-DD` string,
//! intraday bars by UTC epoch seconds, the two time forms the library accepts.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use order_flow::{Bar, TimeFrame};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use super::{Dashboard, DashboardView, RenderError};

const MARKER_COLOR: &str = "#e91e63";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub series: Vec<ChartSeries>,
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<Candle>,
    pub markers: Vec<Marker>,
}

/// A Lightweight-Charts time key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChartTime {
    /// `YYYY-MM-DD`
    BusinessDay(String),
    /// Seconds since the Unix epoch, UTC.
    Timestamp(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub time: ChartTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub time: ChartTime,
    pub position: &'static str,
    pub color: &'static str,
    pub shape: &'static str,
    pub text: &'static str,
}

/// Dark terminal theme.
pub fn chart_options() -> Value {
    json!({
        "layout": {"background": {"color": "#131722"}, "textColor": "#d1d4dc"},
        "grid": {"vertLines": {"color": "#2B2B43"}, "horzLines": {"color": "#2B2B43"}},
        "priceScale": {"borderColor": "#485c7b"},
        "timeScale": {"borderColor": "#485c7b"}
    })
}

/// Chart time key: a business day for daily and longer bars, epoch seconds otherwise.
pub fn chart_time(timeframe: &TimeFrame, bar: &Bar) -> ChartTime {
    if timeframe.is_intraday() {
        ChartTime::Timestamp(bar.timestamp.timestamp())
    } else {
        ChartTime::BusinessDay(bar.timestamp.format("%Y-%m-%d").to_string())
    }
}

pub fn build_payload(view: &DashboardView<'_>) -> ChartPayload {
    let timeframe = &view.series.timeframe;
    let data = view
        .series
        .bars
        .iter()
        .map(|bar| Candle {
            time: chart_time(timeframe, bar),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();
    let markers = view
        .order_blocks
        .iter()
        .map(|bar| Marker {
            time: chart_time(timeframe, bar),
            position: "aboveBar",
            color: MARKER_COLOR,
            shape: "arrowDown",
            text: "OB",
        })
        .collect();

    ChartPayload {
        series: vec![ChartSeries {
            kind: "Candlestick",
            data,
            markers,
        }],
        options: chart_options(),
    }
}

/// Writes the chart payload to a JSON file on every render.
pub struct ChartExport {
    path: PathBuf,
}

impl ChartExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Dashboard for ChartExport {
    fn render(&mut self, view: &DashboardView<'_>) -> Result<(), RenderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, &build_payload(view))?;
        out.flush()?;
        info!(
            path = %self.path.display(),
            candles = view.series.len(),
            markers = view.order_blocks.len(),
            "chart exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use order_flow::{
        BarSeries,
        models::timeframe::TimeFrameUnit,
        sentiment::{Barometer, Stance},
    };
    use tempfile::tempdir;

    use super::*;

    fn bar(h: u32) -> Bar {
        Bar::new(Utc.with_ymd_and_hms(2024, 5, 6, h, 0, 0).unwrap(), 1.0, 2.0, 0.5, 1.5, 10.0)
    }

    fn barometer() -> Barometer {
        Barometer {
            catalysts: vec![],
            stance: Stance::Bearish,
        }
    }

    #[test]
    fn daily_bars_use_plain_dates() {
        let series = BarSeries::new("GC=F", TimeFrame::day(), vec![bar(0)]);
        let blocks = series.bars.clone();
        let barometer = barometer();
        let payload = build_payload(&DashboardView {
            series: &series,
            order_blocks: &blocks,
            barometer: &barometer,
            table_rows: 5,
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["series"][0]["type"], "Candlestick");
        assert_eq!(value["series"][0]["data"][0]["time"], "2024-05-06");
        assert_eq!(value["series"][0]["markers"][0]["shape"], "arrowDown");
        assert_eq!(value["options"]["layout"]["background"]["color"], "#131722");
        assert_eq!(value["options"]["timeScale"]["borderColor"], "#485c7b");
    }

    #[test]
    fn intraday_bars_use_epoch_seconds() {
        let tf = TimeFrame::new(1, TimeFrameUnit::Hour);
        // 2024-05-06T14:00:00Z
        assert_eq!(chart_time(&tf, &bar(14)), ChartTime::Timestamp(1_715_004_000));

        let series = BarSeries::new("BTC-USD", tf, vec![bar(13), bar(14)]);
        let blocks = vec![bar(14)];
        let barometer = barometer();
        let value = serde_json::to_value(build_payload(&DashboardView {
            series: &series,
            order_blocks: &blocks,
            barometer: &barometer,
            table_rows: 5,
        }))
        .unwrap();
        assert_eq!(value["series"][0]["data"][0]["time"], 1_715_000_400i64);
        assert_eq!(value["series"][0]["markers"][0]["time"], 1_715_004_000i64);
        assert!(value["series"][0]["data"][1]["time"].is_i64());
    }

    #[test]
    fn export_writes_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("chart.json");
        let series = BarSeries::new("BTC-USD", TimeFrame::day(), vec![bar(0)]);
        let barometer = barometer();
        let mut export = ChartExport::new(&path);
        export
            .render(&DashboardView {
                series: &series,
                order_blocks: &[],
                barometer: &barometer,
                table_rows: 5,
            })
            .unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["series"][0]["data"].as_array().unwrap().len(), 1);
        assert!(written["series"][0]["markers"].as_array().unwrap().is_empty());
    }
}
