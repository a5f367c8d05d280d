//! The analysis pipeline and the command handlers built on it.
//!
//! One run fetches a single series, then detection, classification and
//! rendering happen synchronously on that snapshot.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use market_data_ingestor::{
    BarsRequestParams, DataProvider, Lookback, ProviderError,
    models::timeframe::TimeFrame,
    providers::{json_file::JsonFileProvider, yahoo_chart::YahooChartProvider},
};
use order_flow::{
    Bar, BarSeries, InvalidInputError, OrderBlockDetector, Scan,
    sentiment::{Barometer, ClassifierError, SentimentClassifier},
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    cli::Commands,
    config::{MarketCfg, TerminalConfig},
    dashboard::{ChartExport, Dashboard, DashboardView, TextDashboard},
    lexicon,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch bars")]
    Fetch(#[from] ProviderError),

    #[error("bars rejected by the detector")]
    Detect(#[from] InvalidInputError),

    #[error("sentiment classification failed")]
    Classify(#[from] ClassifierError),
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct Report {
    pub series: BarSeries,
    pub scan: Scan,
    /// The flagged bars, in series order.
    pub order_blocks: Vec<Bar>,
    pub barometer: Barometer,
}

impl Report {
    pub fn view(&self, table_rows: usize) -> DashboardView<'_> {
        DashboardView {
            series: &self.series,
            order_blocks: &self.order_blocks,
            barometer: &self.barometer,
            table_rows,
        }
    }
}

/// Fetch, detect, assess.
#[instrument(skip_all, fields(symbol = %params.symbol, interval = %params.interval))]
pub async fn analyze<S: AsRef<str>>(
    provider: &dyn DataProvider,
    params: BarsRequestParams,
    detector: &OrderBlockDetector,
    classifier: &dyn SentimentClassifier,
    catalysts: &[S],
) -> Result<Report, PipelineError> {
    let series = provider.fetch_bars(params).await?;
    let scan = detector.scan(&series.bars)?;
    let order_blocks: Vec<Bar> = scan.flagged().map(|i| series.bars[i].clone()).collect();
    let barometer = Barometer::assess(classifier, catalysts)?;

    info!(
        bars = series.len(),
        order_blocks = order_blocks.len(),
        stance = ?barometer.stance,
        "analysis complete"
    );
    Ok(Report {
        series,
        scan,
        order_blocks,
        barometer,
    })
}

/// Picks the file provider when `input` is set, the chart API otherwise.
pub fn build_provider(market: &MarketCfg, input: Option<PathBuf>) -> Result<Box<dyn DataProvider>> {
    match input {
        Some(path) => Ok(Box::new(JsonFileProvider::new(path))),
        None => {
            let provider = YahooChartProvider::builder()
                .base_url(market.base_url.clone())
                .requests_per_minute(market.requests_per_minute)
                .build()
                .context("failed to set up the chart provider")?;
            Ok(Box::new(provider))
        }
    }
}

/// Dispatches a parsed subcommand. Human and JSON output both go to `out`.
pub async fn run<W: Write>(command: Commands, mut cfg: TerminalConfig, out: &mut W) -> Result<()> {
    match command {
        Commands::Dashboard {
            symbol,
            period,
            interval,
            input,
            chart_json,
        } => {
            apply_market_overrides(&mut cfg.market, symbol, period, interval);
            if chart_json.is_some() {
                cfg.dashboard.chart_json = chart_json;
            }
            dashboard(&cfg, input, out).await
        }
        Commands::Scan {
            input,
            window,
            volume_multiplier,
            signals,
        } => {
            if let Some(window) = window {
                cfg.detector.window = window;
            }
            if let Some(multiplier) = volume_multiplier {
                cfg.detector.volume_multiplier = multiplier;
            }
            scan(&cfg, input, signals, out).await
        }
        Commands::Sentiment { texts } => sentiment(&cfg, &texts, out),
    }
}

fn apply_market_overrides(
    market: &mut MarketCfg,
    symbol: Option<String>,
    period: Option<Lookback>,
    interval: Option<TimeFrame>,
) {
    if let Some(symbol) = symbol {
        market.symbol = symbol;
    }
    if let Some(period) = period {
        market.period = period;
    }
    if let Some(interval) = interval {
        market.interval = interval;
    }
}

fn request_params(market: &MarketCfg) -> BarsRequestParams {
    BarsRequestParams::new(market.symbol.clone(), market.period, market.interval)
}

pub async fn dashboard<W: Write>(cfg: &TerminalConfig, input: Option<PathBuf>, out: &mut W) -> Result<()> {
    let detector = OrderBlockDetector::new(cfg.detector.to_detector_config()?);
    let provider = build_provider(&cfg.market, input)?;
    let report = analyze(
        provider.as_ref(),
        request_params(&cfg.market),
        &detector,
        lexicon::shared(),
        &cfg.sentiment.catalysts(),
    )
    .await?;

    let view = report.view(cfg.dashboard.table_rows);
    TextDashboard::new(&mut *out).render(&view)?;
    if let Some(path) = &cfg.dashboard.chart_json {
        ChartExport::new(path).render(&view)?;
    }
    Ok(())
}

pub async fn scan<W: Write>(cfg: &TerminalConfig, input: PathBuf, signals: bool, out: &mut W) -> Result<()> {
    let detector = OrderBlockDetector::new(cfg.detector.to_detector_config()?);
    let provider = JsonFileProvider::new(&input);
    let series = provider
        .fetch_bars(request_params(&cfg.market))
        .await
        .with_context(|| format!("failed to read bars from {}", input.display()))?;

    if signals {
        let scan = detector.scan(&series.bars)?;
        serde_json::to_writer_pretty(&mut *out, &scan)?;
    } else {
        let blocks = detector.detect_series(&series)?;
        serde_json::to_writer_pretty(&mut *out, &blocks)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn sentiment<W: Write>(cfg: &TerminalConfig, texts: &[String], out: &mut W) -> Result<()> {
    let texts = if texts.is_empty() {
        cfg.sentiment.catalysts()
    } else {
        texts.to_vec()
    };
    let barometer = Barometer::assess(lexicon::shared(), &texts)?;
    for catalyst in &barometer.catalysts {
        writeln!(
            out,
            "{:<8} {:.2}  {}",
            catalyst.sentiment.label, catalyst.sentiment.score, catalyst.text
        )?;
    }
    writeln!(out, "{}", barometer.stance.headline())?;
    Ok(())
}
