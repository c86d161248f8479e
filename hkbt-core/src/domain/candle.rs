//! Candle and AdjustedCandle (spec.md §3).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One bar at a fixed interval for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub turnover: f64,
}

impl Candle {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        turnover: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            turnover,
        }
    }

    /// `low <= open,close <= high`; `low > 0`; `volume >= 0` (always true for u64).
    pub fn is_sane(&self) -> bool {
        self.low > 0.0
            && self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Rehabilitation type marker applied to an `AdjustedCandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RehabType {
    None,
    Forward,
    Backward,
}

/// A `Candle` multiplied by the applicable cumulative adjustment factor.
/// Volume is left unchanged (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedCandle {
    pub candle: Candle,
    pub rehab: RehabType,
    pub factor: f64,
}

impl AdjustedCandle {
    pub fn unadjusted(candle: Candle) -> Self {
        Self {
            candle,
            rehab: RehabType::None,
            factor: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(
            NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            open,
            high,
            low,
            close,
            1000,
            100_000.0,
        )
    }

    #[test]
    fn sane_candle_passes() {
        assert!(sample(100.0, 101.0, 99.0, 100.5).is_sane());
    }

    #[test]
    fn inverted_high_low_is_insane() {
        assert!(!sample(100.0, 98.0, 102.0, 100.0).is_sane());
    }

    #[test]
    fn non_positive_low_is_insane() {
        let mut c = sample(100.0, 101.0, 99.0, 100.0);
        c.low = 0.0;
        assert!(!c.is_sane());
    }
}
