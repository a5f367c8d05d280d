//! Terminal front end for the order-flow dashboard.
//!
//! Wires a [`DataProvider`](market_data_ingestor::DataProvider), the
//! [`OrderBlockDetector`](order_flow::OrderBlockDetector) and a
//! [`SentimentClassifier`](order_flow::sentiment::SentimentClassifier) together
//! and hands the result to a [`Dashboard`](dashboard::Dashboard).

pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod lexicon;
pub mod logging;
