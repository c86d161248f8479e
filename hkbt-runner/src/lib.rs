//! hkbt-runner — orchestration glue around `hkbt-core`.
//!
//! Wires a `Context` (market data source, store, clock, cancellation) to the
//! pure simulator, drives one backtest or a parallel batch of them, and
//! shapes the result into spec.md §6's request/result schema. This crate is
//! the only one that touches concurrency (`rayon`) and structured logging
//! output; it carries no CLI or report renderer — those stay out of scope.

pub mod batch;
pub mod config;
pub mod error;
pub mod result;
pub mod runner;

pub use batch::run_batch;
pub use config::{BacktestRequest, StrategyChoice};
pub use error::RunError;
pub use result::{BacktestResult, EquityPoint};
pub use runner::run_backtest;
