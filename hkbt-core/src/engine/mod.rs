//! The backtest engine: order/fill bookkeeping, the bar-by-bar simulator,
//! and post-run metrics (spec.md §4.9).

pub mod accounting;
pub mod metrics;
pub mod simulator;

pub use accounting::{apply_entry, apply_exit, market_fill, apply_slippage, SLIPPAGE_RATE};
pub use metrics::BacktestMetrics;
pub use simulator::{BacktestOutcome, Simulator, SimulatorConfig};
