//! Order-flow analysis primitives.
//!
//! The crate holds the canonical OHLCV models, the order-block detector and the
//! sentiment seam used by the terminal. Everything here is synchronous and free
//! of I/O; data sources and presentation live in other crates.

pub mod detector;
pub mod errors;
pub mod models;
pub mod sentiment;
pub mod stats;

pub use detector::{BarSignal, DetectorConfig, OrderBlockDetector, Scan};
pub use errors::{DetectorConfigError, InvalidBarReason, InvalidInputError};
pub use models::{bar::Bar, bar_series::BarSeries, timeframe::TimeFrame};
