//! Position — an open holding in a single symbol (spec.md §3). The core is
//! long-only: `quantity >= 0`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::SignalId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    /// Share-weighted average cost.
    pub avg_cost: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub open_time: NaiveDateTime,
    pub last_update: NaiveDateTime,
    pub entry_signal: Option<SignalId>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    /// High-water-mark since entry, for trailing stops.
    pub high_water_mark: f64,
}

impl Position {
    pub fn open(
        symbol: impl Into<String>,
        quantity: u64,
        entry_price: f64,
        opened_at: NaiveDateTime,
        entry_signal: Option<SignalId>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            avg_cost: entry_price,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            open_time: opened_at,
            last_update: opened_at,
            entry_signal,
            stop_loss: None,
            take_profit: None,
            high_water_mark: entry_price,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn market_value(&self, mark_price: f64) -> f64 {
        self.quantity as f64 * mark_price
    }

    /// Mark to market and advance the high-water-mark.
    pub fn update_mark(&mut self, mark_price: f64, now: NaiveDateTime) {
        self.unrealized_pnl = (mark_price - self.avg_cost) * self.quantity as f64;
        if mark_price > self.high_water_mark {
            self.high_water_mark = mark_price;
        }
        self.last_update = now;
    }

    /// Add to the position at `price` for `qty` additional shares, updating
    /// the share-weighted average cost.
    pub fn add(&mut self, qty: u64, price: f64) {
        let prior_notional = self.avg_cost * self.quantity as f64;
        self.quantity += qty;
        self.avg_cost = (prior_notional + price * qty as f64) / self.quantity as f64;
    }

    /// Reduce the position by `qty` at `price`, realizing P&L on the
    /// reduced portion. Returns the realized P&L from this reduction.
    pub fn reduce(&mut self, qty: u64, price: f64) -> f64 {
        let qty = qty.min(self.quantity);
        let realized = (price - self.avg_cost) * qty as f64;
        self.realized_pnl += realized;
        self.quantity -= qty;
        if self.quantity == 0 {
            self.unrealized_pnl = 0.0;
        }
        realized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn reduce_realizes_pnl_and_decrements_quantity() {
        let mut p = Position::open("00700.HK", 200, 100.0, now(), None);
        let realized = p.reduce(100, 105.0);
        assert_eq!(realized, 500.0);
        assert_eq!(p.quantity, 100);
        assert_eq!(p.realized_pnl, 500.0);
    }

    #[test]
    fn add_updates_weighted_average_cost() {
        let mut p = Position::open("00700.HK", 100, 100.0, now(), None);
        p.add(100, 110.0);
        assert_eq!(p.quantity, 200);
        assert!((p.avg_cost - 105.0).abs() < 1e-9);
    }

    #[test]
    fn full_reduce_flattens_position() {
        let mut p = Position::open("00700.HK", 100, 100.0, now(), None);
        p.reduce(100, 95.0);
        assert!(p.is_flat());
        assert_eq!(p.unrealized_pnl, 0.0);
    }
}
