//! `prepare`: ties together warm-up selection, retrying fetch, per-candle
//! validation, corporate-action adjustment, and the usability gate into one
//! `PreparedData` handle (or a typed failure).

use chrono::{NaiveDate, NaiveDateTime};

use crate::calendar::TradingCalendar;
use crate::corporate_actions::adjuster::adjust_backward;
use crate::domain::candle::{AdjustedCandle, Candle};
use crate::domain::instrument::Instrument;
use crate::domain::interval::Interval;
use crate::error::{HkError, HkResult};

use super::source::{fetch_candles_with_retry, MarketDataSource, Sleeper};
use super::validation::{DataQualityReport, Validator};

const MIN_WARMUP_TRADING_DAYS: usize = 100;

/// Walk backwards from `start` through the trading calendar accumulating
/// `MIN_WARMUP_TRADING_DAYS` sessions, capped at 200 calendar days of
/// search. Returns the earliest date found even if the target count was
/// not reached (the caller is expected to log a warning in that case).
pub fn warmup_start_date(calendar: &TradingCalendar, start: NaiveDate) -> (NaiveDate, bool) {
    let days = calendar.trading_days_before(start, MIN_WARMUP_TRADING_DAYS);
    let enough = days.len() >= MIN_WARMUP_TRADING_DAYS;
    let earliest = days.first().copied().unwrap_or(start);
    (earliest, enough)
}

pub struct PrepareRequest<'a> {
    pub symbol: &'a str,
    pub interval: Interval,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Fetch, validate, adjust, and quality-gate a candle sequence for
/// `(symbol, interval, [start, end])`.
pub fn prepare(
    source: &dyn MarketDataSource,
    sleeper: &dyn Sleeper,
    calendar: &TradingCalendar,
    instrument: Instrument,
    request: PrepareRequest,
) -> HkResult<super::prepared::PreparedData> {
    let (warmup_start, _enough_history) = warmup_start_date(calendar, request.start.date());
    let warmup_start_ts = warmup_start.and_hms_opt(0, 0, 0).expect("midnight always valid");

    let raw = fetch_candles_with_retry(
        source,
        sleeper,
        request.symbol,
        request.interval,
        warmup_start_ts,
        request.end,
    )
    .map_err(|reason| HkError::SourceUnavailable {
        symbol: request.symbol.to_string(),
        reason,
    })?;

    let report = validate_all(&raw, calendar);
    if !report.usable {
        return Err(HkError::QualityRejected {
            score: report.score,
            reason: format!(
                "data quality gate failed for {} (score {:.1})",
                request.symbol, report.score
            ),
            report: Box::new(report),
        });
    }

    let actions = source
        .fetch_corporate_actions(request.symbol)
        .unwrap_or_default();
    let adjusted = adjust_backward(&raw, &actions, |date| pre_close_before(&raw, date));

    let warmup_end = adjusted
        .iter()
        .position(|c| c.candle.timestamp >= request.start)
        .unwrap_or(adjusted.len());

    if warmup_end < super::prepared::MIN_WARMUP_LEN {
        return Err(HkError::InsufficientData(format!(
            "warm-up length {warmup_end} below the minimum {}",
            super::prepared::MIN_WARMUP_LEN
        )));
    }

    super::prepared::PreparedData::new(adjusted, warmup_end, report, instrument).ok_or_else(|| {
        HkError::InsufficientData(format!(
            "backtest slice below the minimum {} bars",
            super::prepared::MIN_BACKTEST_LEN
        ))
    })
}

fn validate_all(raw: &[Candle], calendar: &TradingCalendar) -> DataQualityReport {
    let mut validator = Validator::new();
    for candle in raw {
        validator.validate(candle, calendar);
    }
    validator.report()
}

fn pre_close_before(candles: &[Candle], ex_date: NaiveDate) -> Option<f64> {
    candles
        .iter()
        .rev()
        .find(|c| c.timestamp.date() < ex_date)
        .map(|c| c.close)
}

/// Views over an already-prepared sequence, split at a given absolute index —
/// used by the simulator to re-derive warm-up/backtest slices without
/// re-running `prepare`.
pub fn window_ending_at(candles: &[AdjustedCandle], index: usize) -> &[AdjustedCandle] {
    &candles[..=index]
}
