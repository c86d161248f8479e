//! Incremental RSI(14), Wilder smoothing (spec.md §4.3).
//!
//! `rsi = 100 - 100 / (1 + avgGain/avgLoss)`. Edge-case convention (spec.md
//! states only the `avgLoss == 0` case; the other two are filled in here,
//! matching the teacher's convention — see DESIGN.md):
//! `avgLoss == 0 -> 100`, `avgGain == 0 -> 0`, both zero -> `50`.

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    gain_seed: Vec<f64>,
    loss_seed: Vec<f64>,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    value: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            gain_seed: Vec::with_capacity(period),
            loss_seed: Vec::with_capacity(period),
            avg_gain: None,
            avg_loss: None,
            value: None,
        }
    }

    pub fn update(&mut self, close: f64) {
        let prev = match self.prev_close {
            Some(p) => p,
            None => {
                self.prev_close = Some(close);
                return;
            }
        };
        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        match (self.avg_gain, self.avg_loss) {
            (Some(ag), Some(al)) => {
                let n = self.period as f64;
                self.avg_gain = Some(((n - 1.0) * ag + gain) / n);
                self.avg_loss = Some(((n - 1.0) * al + loss) / n);
            }
            _ => {
                self.gain_seed.push(gain);
                self.loss_seed.push(loss);
                if self.gain_seed.len() == self.period {
                    self.avg_gain =
                        Some(self.gain_seed.iter().sum::<f64>() / self.period as f64);
                    self.avg_loss =
                        Some(self.loss_seed.iter().sum::<f64>() / self.period as f64);
                }
            }
        }

        if let (Some(ag), Some(al)) = (self.avg_gain, self.avg_loss) {
            self.value = Some(rsi_from_avgs(ag, al));
        }
        self.prev_close = Some(close);
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

fn rsi_from_avgs(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
