//! Yahoo Finance chart API (`/v8/finance/chart/{symbol}`).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{YahooChartProvider, YahooChartProviderBuilder};
