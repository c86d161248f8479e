//! MACD-trend: the home strategy for the `TRENDING` regime.
//!
//! Entry requires a golden cross on the primary timeframe, a positive
//! histogram, cross-timeframe MACD agreement, strong volume, and price above
//! the Bollinger middle band.

use crate::domain::order::OrderSide;
use crate::domain::signal::StrategyTag;

use super::{EntryCandidate, EntryContext, Regime, StopPlan, Strategy, TakeProfitPlan};

const MIN_VOLUME_RATIO: f64 = 1.5;
const ATR_STOP_MULTIPLIER: f64 = 1.5;
const FIXED_STOP_PCT: f64 = 0.97;

pub struct MacdTrend;

impl Strategy for MacdTrend {
    fn tag(&self) -> StrategyTag {
        StrategyTag::MacdTrend
    }

    fn home_regime(&self) -> Regime {
        Regime::Trending
    }

    fn entry(&self, ctx: &EntryContext) -> Option<EntryCandidate> {
        let primary = ctx.primary.macd?;
        let confirm = ctx.confirm.macd?;
        let prev = ctx.prev_primary?.macd?;
        let boll = ctx.primary.boll?;

        let golden_cross = prev.macd <= prev.signal && primary.macd > primary.signal;
        if !golden_cross {
            return None;
        }
        if primary.histogram <= 0.0 {
            return None;
        }
        if confirm.macd <= confirm.signal {
            return None;
        }
        if ctx.primary.volume_ratio < MIN_VOLUME_RATIO {
            return None;
        }
        if ctx.primary.close <= boll.middle {
            return None;
        }

        Some(EntryCandidate {
            side: OrderSide::Buy,
            suggested_price: ctx.candle.close,
        })
    }

    fn stop_plan(&self, entry_price: f64, atr: Option<f64>) -> StopPlan {
        // The 3% floor caps the loss regardless of ATR: take the higher
        // (tighter) of the two candidate stops, never the lower.
        let atr_stop = atr.map(|a| entry_price - ATR_STOP_MULTIPLIER * a);
        let fixed_stop = entry_price * FIXED_STOP_PCT;
        let stop_loss = match atr_stop {
            Some(a) => a.max(fixed_stop),
            None => fixed_stop,
        };
        StopPlan {
            stop_loss,
            take_profit: TakeProfitPlan::Tiered(vec![
                (entry_price * 1.05, 0.30),
                (entry_price * 1.08, 0.40),
                (entry_price * 1.10, 0.30),
            ]),
        }
    }
}
