//! `BacktestResult`: the serializable output schema (spec.md §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hkbt_core::domain::{ConfigHash, TradeRecord};
use hkbt_core::engine::BacktestMetrics;

pub use hkbt_core::domain::portfolio::EquitySnapshot as EquityPoint;

/// Complete result of a single backtest run (spec.md §6's output schema).
/// `success = false` carries `error_code`/`error_message` and whatever
/// partial `trades`/`equity_curve` accumulated before the failure (spec.md
/// §7: cancellation and late-phase failures always return partial results).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub success: bool,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,

    pub symbol: String,
    pub config_hash: ConfigHash,

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
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,

    pub rejected_signals: u64,
    pub cancelled: bool,

    /// Populated only when the request's `generate_detailed_report` is set.
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,

    pub execution_time_ms: u64,
    pub report_generated_at: DateTime<Utc>,
}

impl BacktestResult {
    pub fn from_metrics(
        symbol: String,
        config_hash: ConfigHash,
        metrics: &BacktestMetrics,
        trades: Vec<TradeRecord>,
        equity_curve: Vec<EquityPoint>,
        rejected_signals: u64,
        cancelled: bool,
        execution_time_ms: u64,
        report_generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            symbol,
            config_hash,
            initial_capital: metrics.initial_capital,
            final_equity: metrics.final_equity,
            total_return: metrics.total_return,
            return_rate: metrics.return_rate,
            annualized_return: metrics.annualized_return,
            max_drawdown: metrics.max_drawdown,
            sharpe_ratio: metrics.sharpe_ratio,
            sortino_ratio: metrics.sortino_ratio,
            calmar_ratio: metrics.calmar_ratio,
            total_trades: metrics.total_trades,
            winning_trades: metrics.winning_trades,
            losing_trades: metrics.losing_trades,
            win_rate: metrics.win_rate,
            avg_win: metrics.avg_win,
            avg_loss: metrics.avg_loss,
            profit_factor: metrics.profit_factor,
            rejected_signals,
            cancelled,
            trades,
            equity_curve,
            execution_time_ms,
            report_generated_at,
        }
    }

    /// A result carrying only an error code/message and no statistics — the
    /// shape used for `INVALID_ARGUMENT`/`INSUFFICIENT_DATA`/
    /// `QUALITY_REJECTED` failures that occur before a simulator ever runs.
    pub fn failure(
        symbol: String,
        config_hash: ConfigHash,
        code: &str,
        message: String,
        report_generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            success: false,
            error_code: Some(code.to_string()),
            error_message: Some(message),
            symbol,
            config_hash,
            initial_capital: 0.0,
            final_equity: 0.0,
            total_return: 0.0,
            return_rate: 0.0,
            annualized_return: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            profit_factor: 0.0,
            rejected_signals: 0,
            cancelled: false,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            execution_time_ms: 0,
            report_generated_at,
        }
    }
}
