//! Adaptive position sizer.
//!
//! `position = basePosition * (2 - atrRatio) * signalStrengthFactor *
//! (0.5 + winRateFactor*0.5)`, clamped to `[20_000, maxSinglePosition]`,
//! then quantized down to a multiple of the symbol's lot size.
//! `basePosition = maxSinglePosition`; `atrRatio` is `atr/atr20dayMean`
//! clamped to `[0.5, 1.5]`; `winRateFactor` defaults to `0.5` with fewer
//! than 10 rolling samples.

use crate::domain::instrument::Instrument;

const FLOOR_NOTIONAL: f64 = 20_000.0;
const MIN_SAMPLES_FOR_WIN_RATE: usize = 10;
const DEFAULT_WIN_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct SizingInputs {
    pub strength: f64,
    /// `atr / atr20dayMean`, already clamped to `[0.5, 1.5]` by the caller.
    pub atr_ratio: f64,
    pub rolling_win_rate: f64,
    pub rolling_sample_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PositionSizer {
    pub max_single_position: f64,
}

impl PositionSizer {
    pub fn new(max_single_position: f64) -> Self {
        Self { max_single_position }
    }

    fn win_rate_factor(&self, inputs: &SizingInputs) -> f64 {
        if inputs.rolling_sample_count < MIN_SAMPLES_FOR_WIN_RATE {
            DEFAULT_WIN_RATE
        } else {
            inputs.rolling_win_rate
        }
    }

    /// Target notional in HKD, before lot-size quantization.
    pub fn target_notional(&self, inputs: &SizingInputs) -> f64 {
        let base_position = self.max_single_position;
        let signal_strength_factor = (inputs.strength / 100.0).clamp(0.0, 1.0);
        let win_rate_factor = self.win_rate_factor(inputs);
        let raw = base_position
            * (2.0 - inputs.atr_ratio)
            * signal_strength_factor
            * (0.5 + win_rate_factor * 0.5);
        raw.clamp(FLOOR_NOTIONAL, self.max_single_position)
    }

    /// Quantity to buy at `price`, quantized down to a whole lot.
    pub fn size(&self, price: f64, instrument: &Instrument, inputs: &SizingInputs) -> u64 {
        if price <= 0.0 {
            return 0;
        }
        let notional = self.target_notional(inputs);
        instrument.round_to_lot(notional / price)
    }
}
