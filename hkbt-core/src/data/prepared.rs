//! `PreparedData`: an immutable handle over a contiguous, quality-gated,
//! adjusted candle sequence with a warm-up prefix.

use crate::domain::candle::AdjustedCandle;
use crate::domain::instrument::Instrument;

use super::validation::DataQualityReport;

pub const MIN_WARMUP_LEN: usize = 60;
pub const MIN_BACKTEST_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct PreparedData {
    candles: Vec<AdjustedCandle>,
    /// Index at which the backtest slice begins; everything before it is warm-up only.
    warmup_end: usize,
    pub quality: DataQualityReport,
    pub instrument: Instrument,
}

impl PreparedData {
    /// `warmup_end` is the smallest index whose timestamp is `>= backtest start`.
    /// Fails the handle's usability invariant if either slice is too short.
    pub fn new(
        candles: Vec<AdjustedCandle>,
        warmup_end: usize,
        quality: DataQualityReport,
        instrument: Instrument,
    ) -> Option<Self> {
        if warmup_end < MIN_WARMUP_LEN || candles.len() - warmup_end < MIN_BACKTEST_LEN {
            return None;
        }
        Some(Self {
            candles,
            warmup_end,
            quality,
            instrument,
        })
    }

    pub fn warmup_len(&self) -> usize {
        self.warmup_end
    }

    pub fn backtest_len(&self) -> usize {
        self.candles.len() - self.warmup_end
    }

    pub fn get_warmup_data(&self) -> &[AdjustedCandle] {
        &self.candles[..self.warmup_end]
    }

    pub fn get_backtest_data(&self) -> &[AdjustedCandle] {
        &self.candles[self.warmup_end..]
    }

    pub fn all(&self) -> &[AdjustedCandle] {
        &self.candles
    }

    /// All candles up to and including `index` (absolute index into `all()`).
    pub fn window_ending_at(&self, index: usize) -> &[AdjustedCandle] {
        &self.candles[..=index]
    }
}
