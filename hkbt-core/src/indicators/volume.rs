//! Incremental volume ratio: `volume_t / SMA(volume, 20)`.
//!
//! Undefined (reported as `0.0`) until the 20-bar window fills.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume ratio period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn standard() -> Self {
        Self::new(20)
    }

    /// Returns the ratio for this bar (`0.0` while the window is still filling).
    pub fn update(&mut self, volume: u64) -> f64 {
        let volume = volume as f64;
        self.window.push_back(volume);
        self.sum += volume;
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap();
        }
        if self.window.len() < self.period {
            return 0.0;
        }
        let mean = self.sum / self.period as f64;
        if mean > 0.0 {
            volume / mean
        } else {
            0.0
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            None
        } else {
            let mean = self.sum / self.period as f64;
            self.window.back().map(|&v| if mean > 0.0 { v / mean } else { 0.0 })
        }
    }
}
