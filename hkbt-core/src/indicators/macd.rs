//! Incremental MACD(12, 26, 9) (spec.md §4.3, §9).
//!
//! `macdLine = EMA(12) - EMA(26)`; `signalLine = EMA(9) on macdLine`;
//! `histogram = macdLine - signalLine`. Warm-up = 26 bars.
//!
//! Bearish divergence (spec.md §9 ambiguity, resolved in SPEC_FULL.md §2):
//! over the trailing 20 bars, price makes a new 20-bar high on the current
//! bar while the histogram's local peak over that window is lower than its
//! peak over the previous 20-bar window.

use std::collections::VecDeque;

use super::ema::Ema;

const DIVERGENCE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    value: Option<MacdValue>,
    histogram_history: VecDeque<f64>,
    high_history: VecDeque<f64>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "fast period must be shorter than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            value: None,
            histogram_history: VecDeque::with_capacity(2 * DIVERGENCE_WINDOW),
            high_history: VecDeque::with_capacity(2 * DIVERGENCE_WINDOW),
        }
    }

    pub fn standard() -> Self {
        Self::new(12, 26, 9)
    }

    pub fn update(&mut self, close: f64, high: f64) {
        self.fast.update(close);
        self.slow.update(close);

        if let (Some(f), Some(s)) = (self.fast.value(), self.slow.value()) {
            let macd_line = f - s;
            self.signal.update(macd_line);
            if let Some(signal_line) = self.signal.value() {
                let histogram = macd_line - signal_line;
                self.value = Some(MacdValue {
                    macd: macd_line,
                    signal: signal_line,
                    histogram,
                });
                self.histogram_history.push_back(histogram);
                if self.histogram_history.len() > 2 * DIVERGENCE_WINDOW {
                    self.histogram_history.pop_front();
                }
            }
        }
        self.high_history.push_back(high);
        if self.high_history.len() > 2 * DIVERGENCE_WINDOW {
            self.high_history.pop_front();
        }
    }

    pub fn value(&self) -> Option<MacdValue> {
        self.value
    }

    /// True if the current bar makes a new 20-bar high while the histogram's
    /// peak over this window trails its peak over the prior 20-bar window.
    pub fn bearish_divergence(&self) -> bool {
        let highs: Vec<f64> = self.high_history.iter().copied().collect();
        let hist: Vec<f64> = self.histogram_history.iter().copied().collect();
        if highs.len() < DIVERGENCE_WINDOW || hist.len() < 2 * DIVERGENCE_WINDOW {
            return false;
        }
        let current_high = *highs.last().unwrap();
        let recent_high_window = &highs[highs.len() - DIVERGENCE_WINDOW..];
        let is_new_high = recent_high_window
            .iter()
            .all(|&h| h <= current_high);

        let n = hist.len();
        let current_peak = hist[n - DIVERGENCE_WINDOW..]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let prior_peak = hist[n - 2 * DIVERGENCE_WINDOW..n - DIVERGENCE_WINDOW]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);

        is_new_high && current_peak < prior_peak
    }
}
