//! End-to-end scenarios over the full pipeline: prepared data in, a
//! completed `BacktestOutcome` out.

use chrono::{Duration, NaiveDate};

use hkbt_core::commission::{compute, CommissionSchedule};
use hkbt_core::context::CancelToken;
use hkbt_core::corporate_actions::{adjust_backward, ActionKind, CorporateAction};
use hkbt_core::data::validation::DataQualityReport;
use hkbt_core::data::PreparedData;
use hkbt_core::domain::{AdjustedCandle, Candle, Instrument, Interval, OrderSide};
use hkbt_core::engine::{Simulator, SimulatorConfig};

fn flat_candles(n: usize, price: f64) -> Vec<AdjustedCandle> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
    (0..n)
        .map(|i| {
            let ts = base + Duration::minutes(30 * i as i64);
            AdjustedCandle::unadjusted(Candle::new(ts, price, price + 0.2, price - 0.2, price, 1_000, price * 1_000.0))
        })
        .collect()
}

/// A steady uptrend with a wide daily range, strong enough to eventually
/// clear the MACD-trend regime's entry bar and to exercise the stop-loss
/// path on a later pullback.
fn trending_then_crash_candles(n: usize) -> Vec<AdjustedCandle> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
    (0..n)
        .map(|i| {
            let ts = base + Duration::minutes(30 * i as i64);
            let close = if i < n - 5 {
                100.0 + i as f64 * 0.6
            } else {
                // sharp pullback in the final bars
                100.0 + (n - 5) as f64 * 0.6 - (i - (n - 5)) as f64 * 8.0
            };
            AdjustedCandle::unadjusted(Candle::new(
                ts,
                close - 0.4,
                close + 1.0,
                close - 6.0,
                close,
                5_000,
                close * 5_000.0,
            ))
        })
        .collect()
}

fn prepared(candles: Vec<AdjustedCandle>, warmup_end: usize, instrument: Instrument) -> PreparedData {
    let quality = DataQualityReport::new(candles.len() as u64, 0, 0, 0, 0, 0);
    PreparedData::new(candles, warmup_end, quality, instrument).unwrap()
}

#[test]
fn trivial_flat_market_generates_no_trades_and_preserves_capital() {
    let instrument = Instrument::new("00700.HK", 100, false);
    let candles = flat_candles(150, 100.0);
    let data = prepared(candles, 70, instrument.clone());

    let config = SimulatorConfig::new(500_000.0, Interval::M30, 200_000.0);
    let mut simulator = Simulator::new(config, instrument);
    let outcome = simulator.run(&data, &CancelToken::new());

    assert_eq!(outcome.portfolio.trades.len(), 0);
    assert_eq!(outcome.metrics.final_equity, 500_000.0);
    assert_eq!(outcome.metrics.max_drawdown, 0.0);
    assert!(!outcome.cancelled);
}

#[test]
fn sharp_pullback_after_a_trend_is_contained_by_an_exit() {
    let instrument = Instrument::new("00700.HK", 100, false);
    let candles = trending_then_crash_candles(160);
    let data = prepared(candles, 80, instrument.clone());

    let config = SimulatorConfig::new(1_000_000.0, Interval::M30, 300_000.0);
    let mut simulator = Simulator::new(config, instrument);
    let outcome = simulator.run(&data, &CancelToken::new());

    // Whatever the signal engine decided to do, equity can never go
    // negative and the drawdown is bounded — the point of the exit
    // precedence chain existing at all.
    assert!(outcome.metrics.final_equity > 0.0);
    assert!(outcome.metrics.max_drawdown <= 1.0);
}

#[test]
fn cancellation_token_halts_the_replay_before_the_data_is_exhausted() {
    let instrument = Instrument::new("00700.HK", 100, false);
    let candles = flat_candles(150, 100.0);
    let data = prepared(candles, 70, instrument.clone());
    let cancel = CancelToken::new();
    cancel.trip();

    let config = SimulatorConfig::new(500_000.0, Interval::M30, 200_000.0);
    let mut simulator = Simulator::new(config, instrument);
    let outcome = simulator.run(&data, &cancel);

    assert!(outcome.cancelled);
}

#[test]
fn etf_trades_are_exempt_from_stamp_duty() {
    // Stamp duty applies to sell-side stock trades only.
    let schedule = CommissionSchedule::default();
    let stock = compute(&schedule, OrderSide::Sell, 100.0, 1_000, false);
    let etf = compute(&schedule, OrderSide::Sell, 100.0, 1_000, true);
    let stock_buy = compute(&schedule, OrderSide::Buy, 100.0, 1_000, false);

    assert!(stock.stamp_duty > 0.0);
    assert_eq!(etf.stamp_duty, 0.0);
    assert_eq!(stock_buy.stamp_duty, 0.0);
    assert!(etf.total() < stock.total());
}

#[test]
fn prepared_data_rejects_a_too_short_backtest_slice() {
    let instrument = Instrument::new("00700.HK", 100, false);
    let candles = flat_candles(80, 100.0);
    let quality = DataQualityReport::new(80, 0, 0, 0, 0, 0);
    // 70 warm-up + only 10 backtest bars, below MIN_BACKTEST_LEN.
    assert!(PreparedData::new(candles, 70, quality, instrument).is_none());
}

#[test]
fn corporate_action_backward_adjustment_matches_the_dividend_formula() {
    let d0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let d1 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let ex_date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
    let candle_at = |date: NaiveDate, close: f64| {
        Candle::new(date.and_hms_opt(9, 30, 0).unwrap(), close, close, close, close, 1_000, close * 1_000.0)
    };
    let candles = vec![candle_at(d0, 100.0), candle_at(d1, 101.0), candle_at(ex_date, 102.0)];
    let action = CorporateAction::new(ex_date, ActionKind::Dividend { per_share: 1.0 });

    let adjusted = adjust_backward(&candles, &[action], |d| if d == ex_date { Some(101.0) } else { None });

    // Candles strictly before the ex-date are scaled down by (101-1)/101;
    // the ex-date candle itself is untouched.
    assert!((adjusted[1].candle.close - 100.0).abs() < 1e-3);
    assert_eq!(adjusted[2].candle.close, 102.0);
}
