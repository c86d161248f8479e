//! Incremental ADX(14), Wilder smoothing.
//!
//! `+DM`/`-DM` from consecutive highs/lows, smoothed alongside TR with the
//! same one-pole Wilder recurrence as ATR; `+DI = 100*smoothed(+DM)/smoothed(TR)`,
//! `DX = 100*|+DI - -DI|/(+DI + -DI)`; ADX is itself Wilder-smoothed DX, so
//! the full series needs `2*period` bars before it produces a value.

#[derive(Debug, Clone)]
struct Wilder {
    period: usize,
    seed_buffer: Vec<f64>,
    value: Option<f64>,
}

impl Wilder {
    fn new(period: usize) -> Self {
        Self {
            period,
            seed_buffer: Vec::with_capacity(period),
            value: None,
        }
    }

    fn update(&mut self, x: f64) {
        match self.value {
            Some(prev) => {
                self.value = Some(((self.period as f64 - 1.0) * prev + x) / self.period as f64);
            }
            None => {
                self.seed_buffer.push(x);
                if self.seed_buffer.len() == self.period {
                    self.value = Some(self.seed_buffer.iter().sum::<f64>() / self.period as f64);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    prev_high: Option<f64>,
    prev_low: Option<f64>,
    prev_close: Option<f64>,
    smooth_plus_dm: Wilder,
    smooth_minus_dm: Wilder,
    smooth_tr: Wilder,
    smooth_dx: Wilder,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            prev_high: None,
            prev_low: None,
            prev_close: None,
            smooth_plus_dm: Wilder::new(period),
            smooth_minus_dm: Wilder::new(period),
            smooth_tr: Wilder::new(period),
            smooth_dx: Wilder::new(period),
        }
    }

    pub fn standard() -> Self {
        Self::new(14)
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let (prev_high, prev_low, prev_close) =
            match (self.prev_high, self.prev_low, self.prev_close) {
                (Some(h), Some(l), Some(c)) => (h, l, c),
                _ => {
                    self.prev_high = Some(high);
                    self.prev_low = Some(low);
                    self.prev_close = Some(close);
                    return;
                }
            };

        let up_move = high - prev_high;
        let down_move = prev_low - low;
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        self.smooth_plus_dm.update(plus_dm);
        self.smooth_minus_dm.update(minus_dm);
        self.smooth_tr.update(tr);

        if let (Some(pdm), Some(mdm), Some(atr)) = (
            self.smooth_plus_dm.value,
            self.smooth_minus_dm.value,
            self.smooth_tr.value,
        ) {
            if atr > 0.0 {
                let plus_di = 100.0 * pdm / atr;
                let minus_di = 100.0 * mdm / atr;
                let di_sum = plus_di + minus_di;
                let dx = if di_sum > 0.0 {
                    100.0 * (plus_di - minus_di).abs() / di_sum
                } else {
                    0.0
                };
                self.smooth_dx.update(dx);
            }
        }

        self.prev_high = Some(high);
        self.prev_low = Some(low);
        self.prev_close = Some(close);
    }

    /// `None` until `2*period` bars have been consumed.
    pub fn value(&self) -> Option<f64> {
        self.smooth_dx.value
    }

    pub fn lookback(&self) -> usize {
        2 * self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(adx: &mut Adx, bars: &[(f64, f64, f64)]) {
        for &(h, l, c) in bars {
            adx.update(h, l, c);
        }
    }

    #[test]
    fn undefined_before_double_period() {
        let mut adx = Adx::new(3);
        feed(&mut adx, &[(105.0, 95.0, 102.0), (108.0, 100.0, 106.0)]);
        assert!(adx.value().is_none());
    }

    #[test]
    fn bounded_in_0_to_100() {
        let mut adx = Adx::new(3);
        let bars = [
            (105.0, 95.0, 102.0),
            (108.0, 100.0, 106.0),
            (107.0, 98.0, 99.0),
            (103.0, 97.0, 101.0),
            (106.0, 100.0, 105.0),
            (110.0, 103.0, 108.0),
            (112.0, 106.0, 110.0),
            (111.0, 104.0, 105.0),
            (109.0, 103.0, 107.0),
            (113.0, 105.0, 112.0),
        ];
        feed(&mut adx, &bars);
        if let Some(v) = adx.value() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn strong_uptrend_yields_elevated_adx() {
        let mut adx = Adx::new(5);
        let mut bars = Vec::new();
        for i in 0..30 {
            let base = 100.0 + i as f64 * 5.0;
            bars.push((base + 3.0, base - 3.0, base + 2.0));
        }
        feed(&mut adx, &bars);
        let v = adx.value().expect("should be warmed up after 30 bars");
        assert!(v > 15.0, "expected elevated ADX in strong trend, got {v}");
    }

    #[test]
    fn lookback_is_double_period() {
        assert_eq!(Adx::new(14).lookback(), 28);
    }
}
