//! Single-backtest driver: wires a `BacktestRequest` to the data pipeline,
//! the simulator, and the output schema.

use std::time::Instant;

use tracing::{info, warn};

use hkbt_core::calendar::TradingCalendar;
use hkbt_core::context::Context;
use hkbt_core::data::pipeline::{prepare, PrepareRequest};
use hkbt_core::data::source::Sleeper;
use hkbt_core::domain::{Instrument, InstrumentTable};
use hkbt_core::engine::{Simulator, SimulatorConfig};
use hkbt_core::error::HkError;

use crate::config::BacktestRequest;
use crate::error::RunError;
use crate::result::BacktestResult;

/// Runs one backtest end to end: fetch/validate/adjust (data pipeline),
/// replay (simulator), then shape the output schema (spec.md §6).
///
/// `instruments` resolves the request's symbol to its lot size/ETF flag; the
/// default table (`InstrumentTable::new()`) is almost always the right
/// choice unless the caller has its own symbol metadata overrides.
pub fn run_backtest(
    request: &BacktestRequest,
    ctx: &Context,
    sleeper: &dyn Sleeper,
    instruments: &InstrumentTable,
) -> BacktestResult {
    let started = Instant::now();
    let config_hash = request.config_hash();

    match run_backtest_inner(request, ctx, sleeper, instruments) {
        Ok(result) => finish(result, started, ctx),
        Err(err) => {
            warn!(symbol = %request.symbol, code = err.code(), "backtest failed");
            BacktestResult::failure(
                request.symbol.clone(),
                config_hash,
                err.code(),
                err.to_string(),
                ctx.clock.now().and_utc(),
            )
        }
    }
}

fn finish(mut result: BacktestResult, started: Instant, ctx: &Context) -> BacktestResult {
    result.execution_time_ms = started.elapsed().as_millis() as u64;
    result.report_generated_at = ctx.clock.now().and_utc();
    result
}

fn run_backtest_inner(
    request: &BacktestRequest,
    ctx: &Context,
    sleeper: &dyn Sleeper,
    instruments: &InstrumentTable,
) -> Result<BacktestResult, RunError> {
    request.validate()?;

    let instrument: Instrument = instruments.lookup(&request.symbol);
    let calendar = TradingCalendar::new();

    let data = prepare(
        ctx.market_data.as_ref(),
        sleeper,
        &calendar,
        instrument.clone(),
        PrepareRequest {
            symbol: &request.symbol,
            interval: request.interval,
            start: request.start_time,
            end: request.end_time,
        },
    )
    .map_err(RunError::Core)?;

    info!(
        symbol = %request.symbol,
        warmup_len = data.warmup_len(),
        backtest_len = data.backtest_len(),
        quality_score = data.quality.score,
        "prepared backtest data"
    );

    let mut config = SimulatorConfig::new(request.initial_capital, request.interval, request.initial_capital * 0.4)
        .with_strategy_filter(request.strategy.as_filter());
    if let Some(rate) = request.slippage_rate_override {
        config.slippage_rate = rate;
    }
    if let Some(rate) = request.commission_rate_override {
        config.commission_schedule.commission.rate = rate;
    }

    let mut simulator = Simulator::new(config, instrument);
    let outcome = simulator.run(&data, &ctx.cancel);

    if outcome.cancelled {
        return Err(RunError::Core(HkError::Cancelled));
    }

    let trades = if request.generate_detailed_report {
        outcome.portfolio.trades.clone()
    } else {
        Vec::new()
    };
    let equity_curve = if request.generate_detailed_report {
        outcome.portfolio.equity_curve.clone()
    } else {
        Vec::new()
    };

    Ok(BacktestResult::from_metrics(
        request.symbol.clone(),
        request.config_hash(),
        &outcome.metrics,
        trades,
        equity_curve,
        outcome.rejected_signals,
        outcome.cancelled,
        0,
        ctx.clock.now().and_utc(),
    ))
}
