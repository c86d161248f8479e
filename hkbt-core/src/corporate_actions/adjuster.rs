//! Corporate Action Adjuster (spec.md §4.2).
//!
//! Given a list of `CorporateAction` for a symbol and a candle sequence,
//! produces the backward-adjusted sequence. Candles on or after the latest
//! ex-date are unchanged; volume is never adjusted. Full precision is
//! carried internally and only rounded (4dp) on output.

use crate::domain::candle::{AdjustedCandle, Candle, RehabType};
use crate::rounding::round4;

use super::action::CorporateAction;

/// Backward-adjust a candle sequence (ascending by timestamp) against a set
/// of corporate actions for the same symbol.
///
/// The cumulative backward factor on a candle dated `d` is the product of
/// per-event factors for every action whose ex-date is strictly after `d`.
/// `pre_close_lookup` resolves an action's pre-close from the *unadjusted*
/// sequence (the close of the last trading day strictly before its ex-date).
pub fn adjust_backward(
    candles: &[Candle],
    actions: &[CorporateAction],
    pre_close_lookup: impl Fn(chrono::NaiveDate) -> Option<f64>,
) -> Vec<AdjustedCandle> {
    if actions.is_empty() {
        return candles.iter().map(|&c| AdjustedCandle::unadjusted(c)).collect();
    }

    // Precompute each action's scalar factor once, from the unadjusted sequence.
    let mut factors: Vec<(chrono::NaiveDate, f64)> = actions
        .iter()
        .filter_map(|a| {
            pre_close_lookup(a.symbol_ex_date).map(|pc| (a.symbol_ex_date, a.backward_factor(pc)))
        })
        .collect();
    factors.sort_by_key(|(date, _)| *date);

    candles
        .iter()
        .map(|&candle| {
            let date = candle.timestamp.date();
            let cumulative: f64 = factors
                .iter()
                .filter(|(ex_date, _)| *ex_date > date)
                .map(|(_, f)| f)
                .product();

            if (cumulative - 1.0).abs() < 1e-12 {
                return AdjustedCandle {
                    candle,
                    rehab: RehabType::None,
                    factor: 1.0,
                };
            }

            let adjusted = Candle {
                open: round4(candle.open * cumulative),
                high: round4(candle.high * cumulative),
                low: round4(candle.low * cumulative),
                close: round4(candle.close * cumulative),
                ..candle
            };
            AdjustedCandle {
                candle: adjusted,
                rehab: RehabType::Backward,
                factor: cumulative,
            }
        })
        .collect()
}

/// Forward adjustment: multiply candles *on or after* the event date by the
/// reciprocal of the backward factor, leaving history before the event as
/// reported and restating the post-event candles onto the pre-event price
/// scale (the dual of `adjust_backward`).
pub fn adjust_forward(
    candles: &[Candle],
    actions: &[CorporateAction],
    pre_close_lookup: impl Fn(chrono::NaiveDate) -> Option<f64>,
) -> Vec<AdjustedCandle> {
    if actions.is_empty() {
        return candles.iter().map(|&c| AdjustedCandle::unadjusted(c)).collect();
    }

    let mut factors: Vec<(chrono::NaiveDate, f64)> = actions
        .iter()
        .filter_map(|a| {
            pre_close_lookup(a.symbol_ex_date).map(|pc| (a.symbol_ex_date, a.backward_factor(pc)))
        })
        .collect();
    factors.sort_by_key(|(date, _)| *date);

    candles
        .iter()
        .map(|&candle| {
            let date = candle.timestamp.date();
            let cumulative: f64 = factors
                .iter()
                .filter(|(ex_date, _)| *ex_date <= date)
                .map(|(_, f)| f)
                .product();
            let reciprocal = if cumulative > 0.0 { 1.0 / cumulative } else { 1.0 };

            if (reciprocal - 1.0).abs() < 1e-12 {
                return AdjustedCandle {
                    candle,
                    rehab: RehabType::None,
                    factor: 1.0,
                };
            }

            let adjusted = Candle {
                open: round4(candle.open * reciprocal),
                high: round4(candle.high * reciprocal),
                low: round4(candle.low * reciprocal),
                close: round4(candle.close * reciprocal),
                ..candle
            };
            AdjustedCandle {
                candle: adjusted,
                rehab: RehabType::Forward,
                factor: reciprocal,
            }
        })
        .collect()
}
