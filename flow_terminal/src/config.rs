//! Terminal configuration: parsing, defaults, and loading.
//!
//! The configuration is a TOML document with five optional tables:
//! - `[market]` symbol, download period, bar interval and the chart endpoint
//! - `[detector]` rolling window and volume multiplier
//! - `[sentiment]` catalyst headlines to classify
//! - `[dashboard]` order-block table length and optional chart export path
//! - `[log]` default filter and output format
//!
//! Every field has a default, so an empty document is a valid configuration.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`TerminalConfig::from_toml_str`]
//! - Parse + validate from a file path: [`TerminalConfig::load_path`]
//! - Resolve the path from a flag or `FLOW_TERMINAL_CONFIG`: [`TerminalConfig::load`]

use std::path::{Path, PathBuf};

use market_data_ingestor::{Lookback, models::timeframe::TimeFrame};
use order_flow::{
    DetectorConfig, DetectorConfigError,
    detector::{DEFAULT_VOLUME_MULTIPLIER, DEFAULT_WINDOW},
    sentiment::DEFAULT_CATALYSTS,
};
use serde::{Deserialize, Serialize};
use shared_utils::env::get_env_var;
use thiserror::Error;

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "FLOW_TERMINAL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [detector] settings")]
    Detector(#[from] DetectorConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    pub market: MarketCfg,
    pub detector: DetectorCfg,
    pub sentiment: SentimentCfg,
    pub dashboard: DashboardCfg,
    pub log: LogCfg,
}

/// Where the bars come from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketCfg {
    /// Vendor symbol: `"EURUSD=X"`, `"GC=F"`, `"^GSPC"`, `"BTC-USD"`, ...
    pub symbol: String,
    /// Download period (`"60d"`, `"6mo"`, `"1y"`, ...).
    pub period: Lookback,
    /// Bar interval (`"1d"`, `"1h"`, ...).
    pub interval: TimeFrame,
    /// Chart endpoint host.
    pub base_url: String,
    pub requests_per_minute: u32,
}

impl Default for MarketCfg {
    fn default() -> Self {
        Self {
            symbol: "GC=F".to_string(),
            period: Lookback::Days(60),
            interval: TimeFrame::day(),
            base_url: market_data_ingestor::providers::yahoo_chart::provider::DEFAULT_BASE_URL
                .to_string(),
            requests_per_minute: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorCfg {
    pub window: usize,
    pub volume_multiplier: f64,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            volume_multiplier: DEFAULT_VOLUME_MULTIPLIER,
        }
    }
}

impl DetectorCfg {
    pub fn to_detector_config(&self) -> Result<DetectorConfig, DetectorConfigError> {
        DetectorConfig::new(self.window, self.volume_multiplier)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentCfg {
    /// Headlines to classify. An empty list falls back to the built-in catalysts.
    pub catalysts: Vec<String>,
}

impl Default for SentimentCfg {
    fn default() -> Self {
        Self {
            catalysts: DEFAULT_CATALYSTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SentimentCfg {
    pub fn catalysts(&self) -> Vec<String> {
        if self.catalysts.is_empty() {
            DEFAULT_CATALYSTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.catalysts.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardCfg {
    /// How many of the most recent order blocks the table shows.
    pub table_rows: usize,
    /// Write a Lightweight-Charts JSON payload here after rendering.
    pub chart_json: Option<PathBuf>,
}

impl Default for DashboardCfg {
    fn default() -> Self {
        Self {
            table_rows: 5,
            chart_json: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogCfg {
    /// Filter used when `RUST_LOG` is unset, e.g. `"info"` or `"order_flow=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogCfg {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TerminalConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: TerminalConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a configuration file from disk, parse, and validate it.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if given, else the file named by [`CONFIG_ENV_VAR`], else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_path(path),
            None => match get_env_var(CONFIG_ENV_VAR) {
                Ok(path) => Self::load_path(path),
                Err(_) => Ok(Self::default()),
            },
        }
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.to_detector_config()?;
        if self.market.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("market.symbol must not be empty".into()));
        }
        if self.market.requests_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "market.requests_per_minute must be positive".into(),
            ));
        }
        if self.dashboard.table_rows == 0 {
            return Err(ConfigError::Invalid(
                "dashboard.table_rows must be positive".into(),
            ));
        }
        Ok(())
    }
}
