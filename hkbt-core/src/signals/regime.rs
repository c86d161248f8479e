//! Regime classification: coarse market state driving strategy selection.

use crate::indicators::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Trending,
    Ranging,
    Breakout,
    Neutral,
}

const TRENDING_ADX: f64 = 25.0;
const TRENDING_BANDWIDTH: f64 = 0.10;
const RANGING_ADX: f64 = 20.0;
const RANGING_BANDWIDTH: f64 = 0.05;
const BREAKOUT_VOLUME_RATIO: f64 = 2.0;

pub fn classify(primary: &IndicatorSnapshot) -> Regime {
    let adx = primary.adx.unwrap_or(0.0);
    let bandwidth = primary.boll.map(|b| b.bandwidth).unwrap_or(0.0);

    if adx >= TRENDING_ADX && bandwidth > TRENDING_BANDWIDTH {
        return Regime::Trending;
    }
    if adx < RANGING_ADX && bandwidth < RANGING_BANDWIDTH {
        return Regime::Ranging;
    }
    let above_upper = primary.boll.is_some_and(|b| primary.close > b.upper);
    let above_high20 = primary.high20.is_some_and(|h| primary.close > h);
    if primary.volume_ratio > BREAKOUT_VOLUME_RATIO && (above_upper || above_high20) {
        return Regime::Breakout;
    }
    Regime::Neutral
}
