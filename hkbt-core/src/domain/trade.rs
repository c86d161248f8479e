//! TradeRecord — a completed round-trip trade (spec.md §3, §8 metrics).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::{SignalId, TradeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeId,
    pub symbol: String,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: u64,
    pub pnl: f64,
    pub commission_paid: f64,
    pub entry_signal: Option<SignalId>,
    pub exit_reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TrailingStop,
    TakeProfit,
    RegimeChange,
    EndOfRun,
}

impl TradeRecord {
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            0.0
        } else {
            (self.exit_price - self.entry_price) / self.entry_price
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
