//! Post-loop performance metrics (spec.md §4.9, §6 result schema).

use serde::{Deserialize, Serialize};

use crate::domain::portfolio::Portfolio;

/// Bars per calendar year, used to annualize bar-level return statistics.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub return_rate: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub win_rate: f64,
    /// Mean P&L of winning trades.
    pub avg_win: f64,
    /// Mean P&L of losing trades (signed, i.e. negative).
    pub avg_loss: f64,
    pub profit_factor: f64,
}

/// Per-bar fractional returns off the recorded equity curve.
fn bar_returns(portfolio: &Portfolio) -> Vec<f64> {
    portfolio
        .equity_curve
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                Some((w[1].equity - prev) / prev)
            } else {
                None
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn stddev(values: &[f64], mean_value: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean_value).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn downside_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let downside_sq: f64 = values.iter().map(|v| v.min(0.0).powi(2)).sum();
    (downside_sq / values.len() as f64).sqrt()
}

/// Computes the full result-schema metric set from a completed (or
/// cancelled-midway) Portfolio. `bars_per_day` comes from the backtest's
/// candle interval (`Interval::bars_per_day`).
pub fn compute(portfolio: &Portfolio, bars_per_day: f64) -> BacktestMetrics {
    let final_equity = portfolio
        .equity_curve
        .last()
        .map(|s| s.equity)
        .unwrap_or(portfolio.cash);
    let total_return = final_equity - portfolio.initial_capital;
    let return_rate = if portfolio.initial_capital > 0.0 {
        total_return / portfolio.initial_capital
    } else {
        0.0
    };

    let n_bars = portfolio.equity_curve.len().max(1) as f64;
    let annualization_factor = TRADING_DAYS_PER_YEAR * bars_per_day;
    let annualized_return = (1.0 + return_rate).powf(annualization_factor / n_bars) - 1.0;

    let returns = bar_returns(portfolio);
    let mean_return = mean(&returns);
    let sd = stddev(&returns, mean_return);
    let downside_sd = downside_stddev(&returns);
    let sqrt_annualization = annualization_factor.sqrt();

    let sharpe_ratio = if sd > 0.0 {
        mean_return / sd * sqrt_annualization
    } else {
        0.0
    };
    let sortino_ratio = if downside_sd > 0.0 {
        mean_return / downside_sd * sqrt_annualization
    } else {
        0.0
    };
    let calmar_ratio = if portfolio.max_drawdown > 0.0 {
        annualized_return / portfolio.max_drawdown
    } else {
        0.0
    };

    let (wins, losses): (Vec<f64>, Vec<f64>) =
        portfolio.trades.iter().map(|t| t.pnl).partition(|pnl| *pnl > 0.0);
    let total_trades = portfolio.trades.len() as u64;
    let winning_trades = wins.len() as u64;
    let losing_trades = losses.len() as u64;
    let win_rate = if total_trades > 0 {
        winning_trades as f64 / total_trades as f64
    } else {
        0.0
    };
    let avg_win = mean(&wins);
    let avg_loss = mean(&losses);
    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    BacktestMetrics {
        initial_capital: portfolio.initial_capital,
        final_equity,
        total_return,
        return_rate,
        annualized_return,
        max_drawdown: portfolio.max_drawdown,
        sharpe_ratio,
        sortino_ratio,
        calmar_ratio,
        total_trades,
        winning_trades,
        losing_trades,
        win_rate,
        avg_win,
        avg_loss,
        profit_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{ExitReason, TradeRecord};
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    #[test]
    fn flat_equity_curve_yields_zero_return_and_no_drawdown() {
        let mut p = Portfolio::new(100_000.0);
        p.record_equity(now(), 100_000.0);
        p.record_equity(now(), 100_000.0);
        let m = compute(&p, 11.0);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.profit_factor, 0.0);
    }

    #[test]
    fn win_rate_and_profit_factor_reflect_trade_mix() {
        let mut p = Portfolio::new(100_000.0);
        p.trades.push(TradeRecord {
            id: crate::domain::ids::TradeId(1),
            symbol: "00700.HK".into(),
            entry_time: now(),
            exit_time: now(),
            entry_price: 100.0,
            exit_price: 110.0,
            quantity: 100,
            pnl: 1000.0,
            commission_paid: 10.0,
            entry_signal: None,
            exit_reason: ExitReason::TakeProfit,
        });
        p.trades.push(TradeRecord {
            id: crate::domain::ids::TradeId(2),
            symbol: "00700.HK".into(),
            entry_time: now(),
            exit_time: now(),
            entry_price: 100.0,
            exit_price: 95.0,
            quantity: 100,
            pnl: -500.0,
            commission_paid: 10.0,
            entry_signal: None,
            exit_reason: ExitReason::StopLoss,
        });
        p.record_equity(now(), 100_500.0);
        let m = compute(&p, 11.0);
        assert_eq!(m.total_trades, 2);
        assert_eq!(m.winning_trades, 1);
        assert_eq!(m.losing_trades, 1);
        assert_eq!(m.win_rate, 0.5);
        assert!((m.profit_factor - 2.0).abs() < 1e-9);
        assert_eq!(m.avg_win, 1000.0);
        assert_eq!(m.avg_loss, -500.0);
    }

    #[test]
    fn all_winners_with_no_losses_has_infinite_profit_factor() {
        let mut p = Portfolio::new(100_000.0);
        p.trades.push(TradeRecord {
            id: crate::domain::ids::TradeId(1),
            symbol: "00700.HK".into(),
            entry_time: now(),
            exit_time: now(),
            entry_price: 100.0,
            exit_price: 110.0,
            quantity: 100,
            pnl: 1000.0,
            commission_paid: 10.0,
            entry_signal: None,
            exit_reason: ExitReason::TakeProfit,
        });
        let m = compute(&p, 11.0);
        assert!(m.profit_factor.is_infinite());
    }
}
