//! Per-symbol rolling indicator state, updated in O(1) per bar.
//!
//! One `IndicatorEngine` holds every indicator required downstream: MACD,
//! Bollinger, ATR (plus its 20-bar mean), RSI, ADX, volume ratio, the two
//! trend EMAs used for cross-timeframe agreement, and the rolling 20-bar
//! high/prev-high pair. `update` is called exactly once per bar in
//! chronological order; `snapshot` exposes the tuple of current values,
//! each `None`/`0.0` until its own warm-up window has filled.

use crate::domain::candle::Candle;

use super::adx::Adx;
use super::atr::Atr;
use super::bollinger::{Bollinger, BollingerValue};
use super::ema::Ema;
use super::high_low::{RollingHigh20, RollingMean};
use super::macd::{Macd, MacdValue};
use super::rsi::Rsi;
use super::volume::VolumeRatio;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub prev_close: Option<f64>,
    pub macd: Option<MacdValue>,
    pub macd_bearish_divergence: bool,
    pub boll: Option<BollingerValue>,
    pub atr: Option<f64>,
    pub atr20_mean: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub volume_ratio: f64,
    pub high20: Option<f64>,
    pub prev_high20: Option<f64>,
}

impl IndicatorSnapshot {
    /// `atr / close`, the volatility-regime ratio used by the market-state layer.
    pub fn atr_ratio_price(&self) -> Option<f64> {
        match (self.atr, self.close) {
            (Some(atr), close) if close > 0.0 => Some(atr / close),
            _ => None,
        }
    }

    /// `atr / atr20dayMean`, clamped to `[0.5, 1.5]`, the sizing-side ratio.
    pub fn atr_ratio_mean(&self) -> Option<f64> {
        match (self.atr, self.atr20_mean) {
            (Some(atr), Some(mean)) if mean > 0.0 => Some((atr / mean).clamp(0.5, 1.5)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    macd: Macd,
    boll: Bollinger,
    atr: Atr,
    atr_mean: RollingMean,
    rsi: Rsi,
    adx: Adx,
    ema20: Ema,
    ema50: Ema,
    volume_ratio: VolumeRatio,
    high20: RollingHigh20,
    prev_close: Option<f64>,
    bars_seen: u64,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self {
            macd: Macd::standard(),
            boll: Bollinger::standard(),
            atr: Atr::new(14),
            atr_mean: RollingMean::new(20),
            rsi: Rsi::new(14),
            adx: Adx::standard(),
            ema20: Ema::new(20),
            ema50: Ema::new(50),
            volume_ratio: VolumeRatio::standard(),
            high20: RollingHigh20::standard(),
            prev_close: None,
            bars_seen: 0,
        }
    }

    /// Called exactly once per bar, in chronological order.
    pub fn update(&mut self, candle: &Candle) {
        self.macd.update(candle.close, candle.high);
        self.boll.update(candle.close);
        self.atr.update(candle.high, candle.low, candle.close);
        if let Some(atr) = self.atr.value() {
            self.atr_mean.update(atr);
        }
        self.rsi.update(candle.close);
        self.adx.update(candle.high, candle.low, candle.close);
        self.ema20.update(candle.close);
        self.ema50.update(candle.close);
        self.volume_ratio.update(candle.volume);
        self.high20.update(candle.high);
        self.bars_seen += 1;
        self.prev_close = Some(candle.close);
    }

    pub fn snapshot(&self, close: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            close,
            prev_close: self.prev_close,
            macd: self.macd.value(),
            macd_bearish_divergence: self.macd.bearish_divergence(),
            boll: self.boll.value(),
            atr: self.atr.value(),
            atr20_mean: self.atr_mean.value(),
            rsi: self.rsi.value(),
            adx: self.adx.value(),
            ema20: self.ema20.value(),
            ema50: self.ema50.value(),
            volume_ratio: self.volume_ratio.value().unwrap_or(0.0),
            high20: self.high20.high20(),
            prev_high20: self.high20.prev_high(),
        }
    }

    /// MACD's own warm-up requirement (26 bars) is the largest of the set
    /// that gates signal generation; ADX needs `2*14=28`.
    pub fn is_warmed_up(&self) -> bool {
        self.bars_seen >= 28
    }
}
