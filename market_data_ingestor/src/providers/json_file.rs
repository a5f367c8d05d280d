//! Offline provider reading bars from a JSON file.
//!
//! The file holds either a bare array of bars or a full serialized
//! [`BarSeries`]. For a bare array the symbol and interval come from the request.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use order_flow::Bar;
use snafu::ResultExt;
use tracing::info;

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{DataProvider, DecodeSnafu, IoSnafu, ProviderError},
};

pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataProvider for JsonFileProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .context(IoSnafu { path: &self.path })?;
        // The root token picks the shape, so decode errors point at the offending field.
        let series = if text.trim_start().starts_with('[') {
            let bars: Vec<Bar> =
                serde_json::from_str(&text).context(DecodeSnafu { path: &self.path })?;
            BarSeries::new(params.symbol, params.interval, bars)
        } else {
            serde_json::from_str::<BarSeries>(&text).context(DecodeSnafu { path: &self.path })?
        };
        info!(path = %self.path.display(), bars = series.len(), "loaded bars from file");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use order_flow::TimeFrame;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::models::request_params::Lookback;

    fn params() -> BarsRequestParams {
        BarsRequestParams::new("BTC-USD", Lookback::Days(60), TimeFrame::day())
    }

    #[tokio::test]
    async fn reads_a_bare_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"timestamp":"2024-01-02","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":100}}]"#
        )
        .unwrap();

        let series = JsonFileProvider::new(file.path()).fetch_bars(params()).await.unwrap();
        assert_eq!(series.symbol, "BTC-USD");
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].volume, 100.0);
    }

    #[tokio::test]
    async fn reads_a_full_series() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"symbol":"^GSPC","timeframe":"1wk","bars":[]}}"#
        )
        .unwrap();

        let series = JsonFileProvider::new(file.path()).fetch_bars(params()).await.unwrap();
        assert_eq!(series.symbol, "^GSPC");
        assert_eq!(series.timeframe.to_string(), "1wk");
    }

    #[tokio::test]
    async fn reports_missing_and_malformed_files() {
        let err = JsonFileProvider::new("/definitely/not/here.json")
            .fetch_bars(params())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = JsonFileProvider::new(file.path()).fetch_bars(params()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn decode_errors_name_the_bad_field() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"timestamp":"yesterday","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":1}}]"#
        )
        .unwrap();
        let err = JsonFileProvider::new(file.path()).fetch_bars(params()).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ProviderError::Decode { .. }));
        assert!(message.contains("unrecognised timestamp: yesterday"), "{message}");
        assert!(!message.contains("untagged"), "{message}");

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"symbol":"^GSPC","timeframe":"1wk"}}"#).unwrap();
        let err = JsonFileProvider::new(file.path()).fetch_bars(params()).await.unwrap_err();
        assert!(err.to_string().contains("missing field `bars`"), "{err}");
    }
}
