use chrono::{Duration, TimeZone, Utc};
use order_flow::{Bar, DetectorConfig, InvalidBarReason, OrderBlockDetector};
use proptest::prelude::*;

fn build_bars(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(close, spread, volume))| {
            Bar::new(
                start + Duration::days(i as i64),
                close,
                close + spread,
                (close - spread).max(0.0),
                close,
                volume,
            )
        })
        .collect()
}

fn rows() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    proptest::collection::vec((1.0f64..500.0, 0.0f64..5.0, 0.0f64..1e6), 0..80)
}

proptest! {
    #[test]
    fn output_is_an_ordered_subsequence(rows in rows(), window in 1usize..30, mult in 0.5f64..3.0) {
        let bars = build_bars(&rows);
        let detector = OrderBlockDetector::new(DetectorConfig::new(window, mult).unwrap());

        let indices = detector.detect_indices(&bars).unwrap();
        let blocks = detector.detect(&bars).unwrap();

        prop_assert_eq!(indices.len(), blocks.len());
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        for (&i, block) in indices.iter().zip(&blocks) {
            prop_assert_eq!(&bars[i], block);
        }
    }

    #[test]
    fn detection_is_pure_and_repeatable(rows in rows(), window in 1usize..30) {
        let bars = build_bars(&rows);
        let snapshot = bars.clone();
        let detector = OrderBlockDetector::new(DetectorConfig::new(window, 1.5).unwrap());

        let first = detector.detect(&bars).unwrap();
        let second = detector.detect(&bars).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(bars, snapshot);
    }

    #[test]
    fn bars_before_the_window_fills_are_never_flagged(rows in rows(), window in 1usize..30) {
        let bars = build_bars(&rows);
        let detector = OrderBlockDetector::new(DetectorConfig::new(window, 0.5).unwrap());
        let indices = detector.detect_indices(&bars).unwrap();
        prop_assert!(indices.iter().all(|&i| i + 1 >= window && i >= 1));
    }

    #[test]
    fn flagged_bars_satisfy_both_thresholds(rows in rows(), window in 1usize..30, mult in 0.5f64..3.0) {
        let bars = build_bars(&rows);
        let detector = OrderBlockDetector::new(DetectorConfig::new(window, mult).unwrap());
        let scan = detector.scan(&bars).unwrap();

        for signal in scan.signals.iter().filter(|s| s.is_order_block) {
            let bar = &bars[signal.index];
            let mean = signal.rolling_mean_volume.unwrap();
            prop_assert!(bar.volume > mean * mult);
            prop_assert!(signal.price_move.unwrap() > scan.close_std.unwrap());
        }
    }
}

#[test]
fn inverted_bar_is_rejected() {
    let mut bars = build_bars(&[(100.0, 1.0, 10.0), (100.0, 1.0, 10.0)]);
    bars[0].high = 90.0;
    bars[0].low = 95.0;

    let err = OrderBlockDetector::default().detect(&bars).unwrap_err();
    assert_eq!(err.index, 0);
    assert!(matches!(err.reason, InvalidBarReason::HighBelowLow { .. }));
}

#[test]
fn single_bar_series_is_not_an_error() {
    let bars = build_bars(&[(100.0, 1.0, 10.0)]);
    assert!(OrderBlockDetector::default().detect(&bars).unwrap().is_empty());
}

#[test]
fn constant_closes_never_displace() {
    let mut rows = vec![(100.0, 1.0, 10.0); 30];
    rows[25].2 = 10_000.0;
    let bars = build_bars(&rows);
    assert!(OrderBlockDetector::default().detect(&bars).unwrap().is_empty());
}
