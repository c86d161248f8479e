//! Volume-breakout: the home strategy for the `BREAKOUT` regime.
//!
//! Entry requires an outsized volume surge, the MACD histogram crossing
//! positive, price clearing the upper band or the 20-bar high, and
//! confirmation-timeframe follow-through.

use crate::domain::order::OrderSide;
use crate::domain::signal::StrategyTag;

use super::{EntryCandidate, EntryContext, Regime, StopPlan, Strategy, TakeProfitPlan};

const MIN_VOLUME_RATIO: f64 = 2.0;
const FIXED_STOP_PCT: f64 = 0.96;
const FIXED_TAKE_PROFIT_PCT: f64 = 1.06;

pub struct VolumeBreakout;

impl Strategy for VolumeBreakout {
    fn tag(&self) -> StrategyTag {
        StrategyTag::VolumeBreakout
    }

    fn home_regime(&self) -> Regime {
        Regime::Breakout
    }

    fn entry(&self, ctx: &EntryContext) -> Option<EntryCandidate> {
        if ctx.primary.volume_ratio <= MIN_VOLUME_RATIO {
            return None;
        }
        let histogram = ctx.primary.macd?.histogram;
        let prev_histogram = ctx.prev_primary?.macd?.histogram;
        let histogram_crossed_positive = prev_histogram <= 0.0 && histogram > 0.0;
        if !histogram_crossed_positive {
            return None;
        }

        let above_upper = ctx.primary.boll.is_some_and(|b| ctx.primary.close > b.upper);
        let above_high20 = ctx.primary.high20.is_some_and(|h| ctx.primary.close > h);
        if !above_upper && !above_high20 {
            return None;
        }

        let confirm_follow_through = ctx
            .confirm
            .prev_high20
            .is_some_and(|prior_high| ctx.confirm.close > prior_high);
        if !confirm_follow_through {
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
            take_profit: TakeProfitPlan::Fixed(entry_price * FIXED_TAKE_PROFIT_PCT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use crate::indicators::{BollingerValue, IndicatorSnapshot, MacdValue};
    use chrono::NaiveDate;

    fn candle(close: f64) -> Candle {
        Candle::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap(),
            close - 1.0,
            close + 0.5,
            close - 2.0,
            close,
            5000,
            close * 5000.0,
        )
    }

    #[test]
    fn surge_with_band_break_and_confirmation_fires_buy() {
        let prev_primary = IndicatorSnapshot {
            macd: Some(MacdValue { macd: -0.1, signal: 0.0, histogram: -0.1 }),
            ..Default::default()
        };
        let primary = IndicatorSnapshot {
            close: 112.0,
            volume_ratio: 2.5,
            macd: Some(MacdValue { macd: 0.2, signal: 0.0, histogram: 0.2 }),
            boll: Some(BollingerValue { middle: 100.0, upper: 108.0, lower: 92.0, bandwidth: 0.16 }),
            high20: Some(107.0),
            ..Default::default()
        };
        let confirm = IndicatorSnapshot {
            close: 111.0,
            prev_high20: Some(109.0),
            ..Default::default()
        };
        let c = candle(112.0);
        let ctx = EntryContext {
            primary: &primary,
            confirm: &confirm,
            prev_primary: Some(&prev_primary),
            candle: &c,
        };
        assert!(VolumeBreakout.entry(&ctx).is_some());
    }

    #[test]
    fn weak_volume_blocks_entry() {
        let prev_primary = IndicatorSnapshot {
            macd: Some(MacdValue { macd: -0.1, signal: 0.0, histogram: -0.1 }),
            ..Default::default()
        };
        let primary = IndicatorSnapshot {
            close: 112.0,
            volume_ratio: 1.2,
            macd: Some(MacdValue { macd: 0.2, signal: 0.0, histogram: 0.2 }),
            boll: Some(BollingerValue { middle: 100.0, upper: 108.0, lower: 92.0, bandwidth: 0.16 }),
            high20: Some(107.0),
            ..Default::default()
        };
        let confirm = IndicatorSnapshot {
            close: 111.0,
            prev_high20: Some(109.0),
            ..Default::default()
        };
        let c = candle(112.0);
        let ctx = EntryContext {
            primary: &primary,
            confirm: &confirm,
            prev_primary: Some(&prev_primary),
            candle: &c,
        };
        assert!(VolumeBreakout.entry(&ctx).is_none());
    }

    #[test]
    fn stop_and_take_profit_are_fixed_percentages() {
        let plan = VolumeBreakout.stop_plan(100.0, None);
        assert!((plan.stop_loss - 96.0).abs() < 1e-9);
        match plan.take_profit {
            TakeProfitPlan::Fixed(p) => assert!((p - 106.0).abs() < 1e-9),
            _ => panic!("expected fixed take-profit"),
        }
    }
}
