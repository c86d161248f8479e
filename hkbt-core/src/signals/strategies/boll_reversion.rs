//! BOLL-reversion: the home strategy for the `RANGING` regime.
//!
//! Entry requires price near the lower band with an oversold RSI, a shrinking
//! histogram, confirmation-timeframe support, and a reversal candle.

use crate::domain::order::OrderSide;
use crate::domain::signal::StrategyTag;

use super::{is_doji, is_hammer, EntryCandidate, EntryContext, Regime, StopPlan, Strategy, TakeProfitPlan};

const LOWER_BAND_PROXIMITY: f64 = 0.01;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_TAKE_PROFIT: f64 = 70.0;
const FIXED_STOP_PCT: f64 = 0.98;

pub struct BollReversion;

impl Strategy for BollReversion {
    fn tag(&self) -> StrategyTag {
        StrategyTag::BollReversion
    }

    fn home_regime(&self) -> Regime {
        Regime::Ranging
    }

    fn entry(&self, ctx: &EntryContext) -> Option<EntryCandidate> {
        let boll = ctx.primary.boll?;
        let rsi = ctx.primary.rsi?;
        let histogram = ctx.primary.macd?.histogram;
        let prev_histogram = ctx.prev_primary?.macd?.histogram;

        let near_lower_band = boll.lower > 0.0
            && (ctx.primary.close - boll.lower).abs() / boll.lower <= LOWER_BAND_PROXIMITY;
        if !near_lower_band {
            return None;
        }
        if rsi >= RSI_OVERSOLD {
            return None;
        }
        if histogram.abs() >= prev_histogram.abs() {
            return None;
        }
        // 120m confirmation "above its prior low": the confirmation
        // timeframe is itself trending up bar over bar.
        let confirm_supportive = ctx
            .confirm
            .prev_close
            .is_some_and(|prev| ctx.confirm.close > prev);
        if !confirm_supportive {
            return None;
        }
        if !is_hammer(ctx.candle) && !is_doji(ctx.candle) {
            return None;
        }

        Some(EntryCandidate {
            side: OrderSide::Buy,
            suggested_price: ctx.candle.close,
        })
    }

    fn stop_plan(&self, entry_price: f64, _atr: Option<f64>) -> StopPlan {
        StopPlan {
            stop_loss: entry_price * FIXED_STOP_PCT,
            take_profit: TakeProfitPlan::BandOrRsi {
                rsi_threshold: RSI_TAKE_PROFIT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use crate::indicators::{BollingerValue, IndicatorSnapshot, MacdValue};
    use chrono::NaiveDate;

    fn hammer_candle() -> Candle {
        // small body near the top, long lower shadow
        Candle::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap(),
            95.4,
            95.6,
            92.0,
            95.5,
            1000,
            95_000.0,
        )
    }

    #[test]
    fn reversal_near_lower_band_with_oversold_rsi_fires_buy() {
        let prev_primary = IndicatorSnapshot {
            macd: Some(MacdValue { macd: -1.0, signal: -0.5, histogram: -0.5 }),
            ..Default::default()
        };
        let primary = IndicatorSnapshot {
            close: 95.5,
            rsi: Some(25.0),
            macd: Some(MacdValue { macd: -0.8, signal: -0.6, histogram: -0.2 }),
            boll: Some(BollingerValue { middle: 100.0, upper: 105.0, lower: 95.0, bandwidth: 0.1 }),
            ..Default::default()
        };
        let confirm = IndicatorSnapshot {
            close: 101.0,
            prev_close: Some(100.0),
            ..Default::default()
        };
        let c = hammer_candle();
        let ctx = EntryContext {
            primary: &primary,
            confirm: &confirm,
            prev_primary: Some(&prev_primary),
            candle: &c,
        };
        let entry = BollReversion.entry(&ctx);
        assert!(entry.is_some());
    }

    #[test]
    fn rsi_not_oversold_blocks_entry() {
        let prev_primary = IndicatorSnapshot {
            macd: Some(MacdValue { macd: -1.0, signal: -0.5, histogram: -0.5 }),
            ..Default::default()
        };
        let primary = IndicatorSnapshot {
            close: 95.5,
            rsi: Some(45.0),
            macd: Some(MacdValue { macd: -0.8, signal: -0.6, histogram: -0.2 }),
            boll: Some(BollingerValue { middle: 100.0, upper: 105.0, lower: 95.0, bandwidth: 0.1 }),
            ..Default::default()
        };
        let confirm = IndicatorSnapshot {
            close: 101.0,
            prev_close: Some(100.0),
            ..Default::default()
        };
        let c = hammer_candle();
        let ctx = EntryContext {
            primary: &primary,
            confirm: &confirm,
            prev_primary: Some(&prev_primary),
            candle: &c,
        };
        assert!(BollReversion.entry(&ctx).is_none());
    }

    #[test]
    fn stop_loss_is_fixed_two_percent_below_entry() {
        let plan = BollReversion.stop_plan(100.0, None);
        assert!((plan.stop_loss - 98.0).abs() < 1e-9);
    }

    #[test]
    fn hammer_candle_is_detected() {
        assert!(is_hammer(&hammer_candle()));
    }
}
