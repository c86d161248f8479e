//! Incremental Bollinger(20, 2.0) (spec.md §4.3).
//!
//! middle = SMA(20) of close; band = 2.0 * sample stddev over the same
//! window; upper = middle + band; lower = middle - band;
//! bandwidth = (upper - lower) / middle.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub bandwidth: f64,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    window: VecDeque<f64>,
    value: Option<BollingerValue>,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        Self {
            period,
            multiplier,
            window: VecDeque::with_capacity(period),
            value: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(20, 2.0)
    }

    pub fn update(&mut self, close: f64) {
        self.window.push_back(close);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            self.value = None;
            return;
        }
        let mean = self.window.iter().sum::<f64>() / self.period as f64;
        let variance = self
            .window
            .iter()
            .map(|c| (c - mean).powi(2))
            .sum::<f64>()
            / (self.period as f64 - 1.0);
        let stddev = variance.sqrt();
        let band = self.multiplier * stddev;
        let upper = mean + band;
        let lower = mean - band;
        let bandwidth = if mean != 0.0 { (upper - lower) / mean } else { 0.0 };
        self.value = Some(BollingerValue {
            middle: mean,
            upper,
            lower,
            bandwidth,
        });
    }

    pub fn value(&self) -> Option<BollingerValue> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_before_window_fills() {
        let mut b = Bollinger::new(3, 2.0);
        b.update(1.0);
        b.update(2.0);
        assert!(b.value().is_none());
    }

    #[test]
    fn middle_is_sma() {
        let mut b = Bollinger::new(3, 2.0);
        for c in [10.0, 12.0, 14.0] {
            b.update(c);
        }
        assert!((b.value().unwrap().middle - 12.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_has_zero_bandwidth() {
        let mut b = Bollinger::standard();
        for _ in 0..20 {
            b.update(100.0);
        }
        let v = b.value().unwrap();
        assert_eq!(v.upper, v.middle);
        assert_eq!(v.lower, v.middle);
        assert_eq!(v.bandwidth, 0.0);
    }
}
