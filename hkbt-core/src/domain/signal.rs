//! TradingSignal (spec.md §3). Created by the Signal Engine, consumed at
//! most once by the Simulator in the same bar, never mutated.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::SignalId;
use super::order::OrderSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyTag {
    MacdTrend,
    BollReversion,
    VolumeBreakout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub id: SignalId,
    pub symbol: String,
    pub strategy: StrategyTag,
    pub side: OrderSide,
    pub suggested_price: f64,
    /// In `[0, 100]`.
    pub strength: f64,
    pub layer_scores: HashMap<String, f64>,
    pub generated_at: NaiveDateTime,
}
