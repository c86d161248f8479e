//! Incremental ATR(14), Wilder smoothing (spec.md §4.3).
//!
//! `tr_t = max(high-low, |high-prevClose|, |low-prevClose|)`;
//! `atr_t = ((n-1)*atr_{t-1} + tr_t) / n`, seeded with the simple mean of
//! the first `n` TR values.

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    seed_buffer: Vec<f64>,
    value: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            seed_buffer: Vec::with_capacity(period),
            value: None,
        }
    }

    pub fn true_range(&self, high: f64, low: f64) -> f64 {
        match self.prev_close {
            Some(pc) => (high - low).max((high - pc).abs()).max((low - pc).abs()),
            None => high - low,
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let tr = self.true_range(high, low);
        match self.value {
            Some(prev) => {
                self.value =
                    Some(((self.period as f64 - 1.0) * prev + tr) / self.period as f64);
            }
            None => {
                self.seed_buffer.push(tr);
                if self.seed_buffer.len() == self.period {
                    self.value =
                        Some(self.seed_buffer.iter().sum::<f64>() / self.period as f64);
                }
            }
        }
        self.prev_close = Some(close);
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
