//! Market data ingestion.
//!
//! Fetches OHLCV series from external vendors and normalises them into the
//! canonical [`BarSeries`](order_flow::BarSeries) model. Every source sits behind
//! the [`DataProvider`](providers::DataProvider) trait so callers can pick one at
//! runtime.

pub mod models;
pub mod providers;

pub use models::request_params::{BarsRequestParams, Lookback};
pub use providers::{DataProvider, ProviderError, ProviderInitError};
