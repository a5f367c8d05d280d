//! Streaming statistics used by the detector.
//!
//! Both accumulators are single-pass and allocate at most once, so the detector
//! never rescans the series per bar.

use std::{collections::VecDeque, num::NonZeroUsize};

/// Compensated (Kahan) running sum. Supports removal by adding the negation.
#[derive(Debug, Clone, Copy, Default)]
struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    fn add(&mut self, x: f64) {
        let y = x - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum
    }
}

/// Arithmetic mean over a trailing window of fixed length.
///
/// The window includes the most recently pushed sample. Until `window` samples
/// have been pushed the mean is undefined and [`RollingMean::push`] returns `None`.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: NonZeroUsize,
    samples: VecDeque<f64>,
    sum: KahanSum,
}

impl RollingMean {
    pub fn new(window: NonZeroUsize) -> Self {
        Self {
            window,
            samples: VecDeque::with_capacity(window.get()),
            sum: KahanSum::default(),
        }
    }

    pub fn window(&self) -> NonZeroUsize {
        self.window
    }

    /// Slides the window forward by one sample and returns the new mean, if defined.
    pub fn push(&mut self, x: f64) -> Option<f64> {
        if self.samples.len() == self.window.get() {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum.add(-evicted);
            }
        }
        self.samples.push_back(x);
        self.sum.add(x);
        self.mean()
    }

    /// Mean of the current window, or `None` while the window is still filling.
    pub fn mean(&self) -> Option<f64> {
        (self.samples.len() == self.window.get())
            .then(|| self.sum.value() / self.window.get() as f64)
    }
}

/// Welford's single-pass mean / variance accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Variance with the `N-1` denominator; undefined below two samples.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub fn sample_std(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }
}

impl FromIterator<f64> for Welford {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::default();
        for x in iter {
            acc.push(x);
        }
        acc
    }
}
