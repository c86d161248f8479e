//! Incremental technical indicators: each type holds the minimum rolling
//! history it needs and updates in O(1) per bar via exponential recurrence
//! or fixed-window sums — no full recomputation per bar.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod high_low;
pub mod macd;
pub mod rsi;
pub mod volume;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerValue};
pub use ema::Ema;
pub use engine::{IndicatorEngine, IndicatorSnapshot};
pub use high_low::{RollingHigh20, RollingMean};
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use volume::VolumeRatio;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
