//! Per-regime strategies: entry detection plus each strategy's own
//! stop-loss/take-profit plan. A strategy never sees portfolio state — only
//! the current and confirmation indicator snapshots and the triggering
//! candle.

pub mod boll_reversion;
pub mod macd_trend;
pub mod volume_breakout;

pub use boll_reversion::BollReversion;
pub use macd_trend::MacdTrend;
pub use volume_breakout::VolumeBreakout;

use crate::domain::candle::Candle;
use crate::domain::order::OrderSide;
use crate::domain::signal::StrategyTag;
use crate::indicators::IndicatorSnapshot;

use super::regime::Regime;

pub struct EntryContext<'a> {
    pub primary: &'a IndicatorSnapshot,
    pub confirm: &'a IndicatorSnapshot,
    pub prev_primary: Option<&'a IndicatorSnapshot>,
    pub candle: &'a Candle,
}

#[derive(Debug, Clone, Copy)]
pub struct EntryCandidate {
    pub side: OrderSide,
    pub suggested_price: f64,
}

/// A take-profit rule. `Tiered` and `Fixed` are static price targets decided
/// at entry; `BandOrRsi` is re-evaluated against the live snapshot each bar.
#[derive(Debug, Clone)]
pub enum TakeProfitPlan {
    /// `(price, portion of the original position)`, ascending by price.
    Tiered(Vec<(f64, f64)>),
    Fixed(f64),
    BandOrRsi { rsi_threshold: f64 },
}

#[derive(Debug, Clone)]
pub struct StopPlan {
    pub stop_loss: f64,
    pub take_profit: TakeProfitPlan,
}

pub trait Strategy {
    fn tag(&self) -> StrategyTag;
    fn home_regime(&self) -> Regime;
    fn entry(&self, ctx: &EntryContext) -> Option<EntryCandidate>;
    fn stop_plan(&self, entry_price: f64, atr: Option<f64>) -> StopPlan;
}

/// Candle-pattern helpers shared by strategies that key off reversal shape.
pub(super) fn is_hammer(candle: &Candle) -> bool {
    let body = (candle.close - candle.open).abs();
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }
    let lower_shadow = candle.open.min(candle.close) - candle.low;
    let upper_shadow = candle.high - candle.open.max(candle.close);
    body > 0.0 && lower_shadow >= 2.0 * body && upper_shadow <= 0.1 * range
}

pub(super) fn is_doji(candle: &Candle) -> bool {
    let body = (candle.close - candle.open).abs();
    let range = candle.range();
    range > 0.0 && body <= 0.1 * range
}
