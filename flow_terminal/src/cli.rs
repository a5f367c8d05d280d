use std::path::PathBuf;

use clap::{Parser, Subcommand};
use market_data_ingestor::{Lookback, models::timeframe::TimeFrame};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (flow_terminal.toml); falls back to $FLOW_TERMINAL_CONFIG
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch bars, detect order blocks, assess sentiment and print the dashboard
    Dashboard {
        /// Market symbol (e.g. "GC=F", "EURUSD=X", "^GSPC", "BTC-USD")
        #[arg(long)]
        symbol: Option<String>,

        /// Download period (e.g. "60d", "6mo", "1y", "ytd", "max")
        #[arg(long)]
        period: Option<Lookback>,

        /// Bar interval (e.g. "1d", "1h", "1wk")
        #[arg(long)]
        interval: Option<TimeFrame>,

        /// Read bars from a JSON file instead of the network
        #[arg(long)]
        input: Option<PathBuf>,

        /// Also write a Lightweight-Charts JSON payload to this path
        #[arg(long)]
        chart_json: Option<PathBuf>,
    },

    /// Detect order blocks in a bars JSON file and print them as JSON
    Scan {
        /// Bars JSON file (an array of bars or a full series)
        #[arg(long)]
        input: PathBuf,

        /// Rolling volume window
        #[arg(long)]
        window: Option<usize>,

        /// Volume must exceed the rolling mean by this factor
        #[arg(long)]
        volume_multiplier: Option<f64>,

        /// Print per-bar diagnostics instead of only the flagged bars
        #[arg(long)]
        signals: bool,
    },

    /// Classify headlines and print the resulting stance
    Sentiment {
        /// Headlines to classify; the configured catalysts when omitted
        texts: Vec<String>,
    },
}
