pub mod request_params;

pub use order_flow::models::{bar, bar_series, timeframe};
