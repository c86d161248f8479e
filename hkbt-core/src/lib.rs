//! hkbt-core — the Hong Kong equities backtesting and signal-generation
//! engine.
//!
//! This crate contains the pure, deterministic heart of the system:
//! - Domain types (candles, orders, positions, portfolios, trades)
//! - The HK trading calendar and corporate-action adjuster
//! - Data preparation: retry-with-backoff fetch, per-candle validation,
//!   quality scoring, warm-up selection
//! - Incremental technical indicators (MACD, Bollinger, ATR, RSI, ADX, ...)
//! - Regime classification and per-regime signal strategies behind a
//!   four-layer weighted scorer
//! - Position sizing and the pre-trade risk validation chain
//! - The bar-by-bar backtest simulator and its post-run metrics
//!
//! Nothing in this crate touches the filesystem, the network, or wall-clock
//! time directly — those live behind the `Store`, `MarketDataSource`, and
//! `Clock` traits in [`context`], injected by the caller (`hkbt-runner`).

pub mod calendar;
pub mod commission;
pub mod context;
pub mod corporate_actions;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod rounding;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types crossing the `hkbt-runner` batch-runner
    /// boundary (spec.md §5's per-symbol rayon parallelism) are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Portfolio>();
        require_sync::<domain::Portfolio>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<domain::Instrument>();
        require_sync::<domain::Instrument>();
        require_send::<domain::TradingSignal>();
        require_sync::<domain::TradingSignal>();

        require_send::<domain::OrderId>();
        require_sync::<domain::OrderId>();
        require_send::<domain::SignalId>();
        require_sync::<domain::SignalId>();
        require_send::<domain::ConfigHash>();
        require_sync::<domain::ConfigHash>();
        require_send::<domain::RunId>();
        require_sync::<domain::RunId>();

        require_send::<engine::BacktestOutcome>();
        require_sync::<engine::BacktestOutcome>();
        require_send::<engine::SimulatorConfig>();
        require_sync::<engine::SimulatorConfig>();

        require_send::<context::CancelToken>();
        require_sync::<context::CancelToken>();
    }
}
