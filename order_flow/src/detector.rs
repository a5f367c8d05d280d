//! Order-block detection.
//!
//! A bar is an order block when two conditions hold at once:
//!
//! - its volume exceeds the trailing mean volume (window includes the bar
//!   itself) by more than `volume_multiplier`, and
//! - its absolute close-to-close move exceeds the sample standard deviation
//!   of *all* closes in the series.
//!
//! The volume baseline is local and the price threshold is global. Any term
//! that is undefined (window still filling, first bar, fewer than two closes)
//! makes the bar fail the test instead of raising an error.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use order_flow::{Bar, DetectorConfig, OrderBlockDetector};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let closes = [100.0, 100.0, 100.0, 100.0, 150.0, 100.0];
//! let volumes = [10.0, 10.0, 10.0, 10.0, 100.0, 10.0];
//! let bars: Vec<Bar> = closes
//!     .iter()
//!     .zip(volumes)
//!     .enumerate()
//!     .map(|(i, (&c, v))| Bar::new(start + Duration::days(i as i64), c, c, c, c, v))
//!     .collect();
//!
//! let detector = OrderBlockDetector::new(DetectorConfig::new(3, 1.5).unwrap());
//! assert_eq!(detector.detect_indices(&bars).unwrap(), vec![4]);
//! ```

use std::num::NonZeroUsize;

use serde::Serialize;
use tracing::debug;

use crate::{
    errors::{DetectorConfigError, InvalidInputError},
    models::{bar::Bar, bar_series::{validate_bars, BarSeries}},
    stats::{RollingMean, Welford},
};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_VOLUME_MULTIPLIER: f64 = 1.5;

/// Tuning knobs for [`OrderBlockDetector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    window: NonZeroUsize,
    volume_multiplier: f64,
}

impl DetectorConfig {
    /// Builds a config, rejecting a zero window and non-positive or non-finite multipliers.
    pub fn new(window: usize, volume_multiplier: f64) -> Result<Self, DetectorConfigError> {
        let window = NonZeroUsize::new(window).ok_or(DetectorConfigError::ZeroWindow)?;
        if !volume_multiplier.is_finite() || volume_multiplier <= 0.0 {
            return Err(DetectorConfigError::InvalidVolumeMultiplier(volume_multiplier));
        }
        Ok(Self {
            window,
            volume_multiplier,
        })
    }

    pub fn window(&self) -> NonZeroUsize {
        self.window
    }

    pub fn volume_multiplier(&self) -> f64 {
        self.volume_multiplier
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: NonZeroUsize::new(DEFAULT_WINDOW).unwrap_or(NonZeroUsize::MIN),
            volume_multiplier: DEFAULT_VOLUME_MULTIPLIER,
        }
    }
}

/// Per-bar diagnostics produced by [`OrderBlockDetector::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarSignal {
    pub index: usize,
    /// Trailing mean volume, `None` while the window is filling.
    pub rolling_mean_volume: Option<f64>,
    /// `|close[i] - close[i-1]|`, `None` for the first bar.
    pub price_move: Option<f64>,
    pub is_order_block: bool,
}

/// Full result of a scan: one signal per input bar plus the global price threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scan {
    pub signals: Vec<BarSignal>,
    /// Sample standard deviation of every close in the series.
    pub close_std: Option<f64>,
}

impl Scan {
    /// Indices of the bars flagged as order blocks, in input order.
    pub fn flagged(&self) -> impl Iterator<Item = usize> + '_ {
        self.signals
            .iter()
            .filter(|s| s.is_order_block)
            .map(|s| s.index)
    }
}

/// Stateless order-block detector. Cheap to copy and safe to share across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderBlockDetector {
    config: DetectorConfig,
}

impl OrderBlockDetector {
    pub const fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Validates `bars` and computes the per-bar signals.
    pub fn scan(&self, bars: &[Bar]) -> Result<Scan, InvalidInputError> {
        validate_bars(bars)?;

        let close_std = bars.iter().map(|b| b.close).collect::<Welford>().sample_std();
        let multiplier = self.config.volume_multiplier;
        let mut volume_mean = RollingMean::new(self.config.window);
        let mut prev_close: Option<f64> = None;

        let signals: Vec<BarSignal> = bars
            .iter()
            .enumerate()
            .map(|(index, bar)| {
                let rolling_mean_volume = volume_mean.push(bar.volume);
                let price_move = prev_close.map(|prev| (bar.close - prev).abs());
                prev_close = Some(bar.close);

                let volume_spike =
                    rolling_mean_volume.is_some_and(|mean| bar.volume > mean * multiplier);
                let displaced = match (price_move, close_std) {
                    (Some(mv), Some(std)) => mv > std,
                    _ => false,
                };

                BarSignal {
                    index,
                    rolling_mean_volume,
                    price_move,
                    is_order_block: volume_spike && displaced,
                }
            })
            .collect();

        let scan = Scan { signals, close_std };
        debug!(
            bars = bars.len(),
            window = self.config.window.get(),
            volume_multiplier = multiplier,
            close_std = ?scan.close_std,
            order_blocks = scan.flagged().count(),
            "order block scan finished"
        );
        Ok(scan)
    }

    /// Indices of the order-block bars.
    pub fn detect_indices(&self, bars: &[Bar]) -> Result<Vec<usize>, InvalidInputError> {
        Ok(self.scan(bars)?.flagged().collect())
    }

    /// The order-block bars themselves, cloned in input order.
    pub fn detect(&self, bars: &[Bar]) -> Result<Vec<Bar>, InvalidInputError> {
        Ok(self
            .detect_indices(bars)?
            .into_iter()
            .map(|i| bars[i].clone())
            .collect())
    }

    pub fn detect_series(&self, series: &BarSeries) -> Result<Vec<Bar>, InvalidInputError> {
        self.detect(&series.bars)
    }
}
