//! Multi-symbol batch backtests: independent `(symbol, strategy)` runs in
//! parallel worker tasks, merged at the end (spec.md §5, concurrency
//! boundary 2). No shared mutable state crosses threads — each run gets its
//! own `Simulator`, its own indicator state, its own `Portfolio`.

use rayon::prelude::*;

use hkbt_core::context::Context;
use hkbt_core::data::source::Sleeper;
use hkbt_core::domain::InstrumentTable;

use crate::config::BacktestRequest;
use crate::result::BacktestResult;
use crate::runner::run_backtest;

/// Runs every request in `requests` in parallel and returns one
/// `BacktestResult` per request, in the same order. A single cancelled or
/// failed request does not affect the others — each result carries its own
/// `success`/`cancelled` flag.
///
/// `sleeper` must be `Sync` since every worker task shares it read-only (the
/// data pipeline's retry backoff has no per-run state to race on).
pub fn run_batch(
    requests: &[BacktestRequest],
    ctx: &Context,
    sleeper: &(dyn Sleeper + Sync),
    instruments: &InstrumentTable,
) -> Vec<BacktestResult> {
    requests
        .par_iter()
        .map(|request| run_backtest(request, ctx, sleeper, instruments))
        .collect()
}
