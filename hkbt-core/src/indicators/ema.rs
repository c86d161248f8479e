//! Incremental EMA (spec.md §4.3).
//!
//! `ema_t = alpha * close_t + (1 - alpha) * ema_{t-1}`, `alpha = 2 / (n + 1)`.
//! Seeded with the SMA of the first `n` closes; undefined before that.

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    seed_buffer: Vec<f64>,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_buffer: Vec::with_capacity(period),
            value: None,
        }
    }

    /// Feed one more close. Must be called exactly once per bar, in order.
    pub fn update(&mut self, close: f64) {
        match self.value {
            Some(prev) => {
                self.value = Some(self.alpha * close + (1.0 - self.alpha) * prev);
            }
            None => {
                self.seed_buffer.push(close);
                if self.seed_buffer.len() == self.period {
                    let sma = self.seed_buffer.iter().sum::<f64>() / self.period as f64;
                    self.value = Some(sma);
                }
            }
        }
    }

    /// `None` until the seed window of `period` bars has been consumed.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_before_seed_window() {
        let mut ema = Ema::new(3);
        ema.update(10.0);
        ema.update(11.0);
        assert_eq!(ema.value(), None);
    }

    #[test]
    fn seeds_with_sma() {
        let mut ema = Ema::new(3);
        for c in [10.0, 11.0, 12.0] {
            ema.update(c);
        }
        assert!((ema.value().unwrap() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn recurses_after_seed() {
        let mut ema = Ema::new(2); // alpha = 2/3
        ema.update(10.0);
        ema.update(12.0); // seed sma = 11.0
        ema.update(14.0); // alpha*14 + (1-alpha)*11 = 2/3*14 + 1/3*11 = 13.0
        assert!((ema.value().unwrap() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn incremental_equals_batch_recurrence() {
        let closes = [10.0, 12.0, 11.0, 13.0, 15.0, 14.0, 16.0];
        let period = 3;
        let mut ema = Ema::new(period);
        let mut incremental = Vec::new();
        for &c in &closes {
            ema.update(c);
            incremental.push(ema.value());
        }

        // batch recompute from scratch using the same recurrence
        let alpha = 2.0 / (period as f64 + 1.0);
        let mut batch = vec![None; closes.len()];
        let mut running: Option<f64> = None;
        let mut seed = Vec::new();
        for (i, &c) in closes.iter().enumerate() {
            running = match running {
                Some(prev) => Some(alpha * c + (1.0 - alpha) * prev),
                None => {
                    seed.push(c);
                    if seed.len() == period {
                        Some(seed.iter().sum::<f64>() / period as f64)
                    } else {
                        None
                    }
                }
            };
            batch[i] = running;
        }
        assert_eq!(incremental, batch);
    }
}
