//! Portfolio — aggregate state of cash + all open positions (spec.md §3).
//!
//! Invariant: `cash + Σ position.marketValue == equity` at every bar close.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::position::Position;
use super::trade::TradeRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: HashMap<String, Position>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquitySnapshot>,
    pub peak_equity: f64,
    pub max_drawdown: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            max_drawdown: 0.0,
        }
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions
            .get(symbol)
            .map(|p| !p.is_flat())
            .unwrap_or(false)
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn get_position_mut(&mut self, symbol: &str) -> Option<&mut Position> {
        self.positions.get_mut(symbol)
    }

    /// `cash + Σ marketValue(mark_prices)`.
    pub fn equity(&self, mark_prices: &HashMap<String, f64>) -> f64 {
        let positions_value: f64 = self
            .positions
            .values()
            .filter(|p| !p.is_flat())
            .map(|p| {
                let mark = mark_prices.get(&p.symbol).copied().unwrap_or(p.avg_cost);
                p.market_value(mark)
            })
            .sum();
        self.cash + positions_value
    }

    /// Record an equity snapshot and update the running peak/drawdown.
    pub fn record_equity(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquitySnapshot { timestamp, equity });
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        let drawdown = if self.peak_equity > 0.0 {
            (self.peak_equity - equity) / self.peak_equity
        } else {
            0.0
        };
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    pub fn current_drawdown(&self, equity: f64) -> f64 {
        if self.peak_equity <= 0.0 {
            0.0
        } else {
            ((self.peak_equity - equity) / self.peak_equity).max(0.0)
        }
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
    fn equity_with_no_positions_is_cash() {
        let p = Portfolio::new(100_000.0);
        assert_eq!(p.equity(&HashMap::new()), 100_000.0);
    }

    #[test]
    fn record_equity_tracks_peak_and_drawdown() {
        let mut p = Portfolio::new(100_000.0);
        p.record_equity(now(), 110_000.0);
        p.record_equity(now(), 99_000.0);
        assert_eq!(p.peak_equity, 110_000.0);
        assert!((p.max_drawdown - (1.0 - 99_000.0 / 110_000.0)).abs() < 1e-9);
    }
}
