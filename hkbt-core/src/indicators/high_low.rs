//! Rolling 20-bar high and the immediately preceding 20-bar high
//! (`high20Day` / `prevHigh`), plus a plain rolling-mean helper used for
//! `atr20dayMean` in the position sizer.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingHigh20 {
    period: usize,
    window: VecDeque<f64>,
    prev_window: VecDeque<f64>,
}

impl RollingHigh20 {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "rolling-high period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            prev_window: VecDeque::with_capacity(period),
        }
    }

    pub fn standard() -> Self {
        Self::new(20)
    }

    pub fn update(&mut self, high: f64) {
        self.window.push_back(high);
        if self.window.len() > self.period {
            let overflow = self.window.pop_front().unwrap();
            self.prev_window.push_back(overflow);
            if self.prev_window.len() > self.period {
                self.prev_window.pop_front();
            }
        }
    }

    /// Running max of `high` over the last `period` bars.
    pub fn high20(&self) -> Option<f64> {
        if self.window.len() < self.period {
            None
        } else {
            self.window.iter().cloned().fold(None, |m, v| {
                Some(m.map_or(v, |m: f64| m.max(v)))
            })
        }
    }

    /// Running max of `high` over the `period` bars immediately preceding the
    /// current window.
    pub fn prev_high(&self) -> Option<f64> {
        if self.prev_window.len() < self.period {
            None
        } else {
            self.prev_window.iter().cloned().fold(None, |m, v| {
                Some(m.map_or(v, |m: f64| m.max(v)))
            })
        }
    }
}

/// Plain rolling mean, used for `atr20dayMean` (the sizer's volatility-vs-recent-average ratio).
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "rolling-mean period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, x: f64) {
        self.window.push_back(x);
        self.sum += x;
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap();
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            None
        } else {
            Some(self.sum / self.period as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high20_is_running_max() {
        let mut r = RollingHigh20::new(3);
        for h in [10.0, 15.0, 12.0] {
            r.update(h);
        }
        assert_eq!(r.high20(), Some(15.0));
    }

    #[test]
    fn prev_high_tracks_the_window_before_current() {
        let mut r = RollingHigh20::new(2);
        r.update(10.0);
        r.update(20.0); // window = [10, 20]
        r.update(5.0); // window = [20, 5], prev_window = [10]
        assert_eq!(r.high20(), Some(20.0));
        assert!(r.prev_high().is_none()); // prev_window not full yet
        r.update(6.0); // window = [5, 6], prev_window = [10, 20]
        assert_eq!(r.prev_high(), Some(20.0));
    }

    #[test]
    fn rolling_mean_matches_simple_average() {
        let mut m = RollingMean::new(3);
        for x in [1.0, 2.0, 3.0] {
            m.update(x);
        }
        assert!((m.value().unwrap() - 2.0).abs() < 1e-9);
    }
}
