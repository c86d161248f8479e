//! Four-layer weighted scoring filter over a pair of indicator snapshots
//! (primary timeframe plus a higher confirmation timeframe).

use crate::indicators::IndicatorSnapshot;

pub const MARKET_STATE_WEIGHT: f64 = 0.15;
pub const MACD_WEIGHT: f64 = 0.35;
pub const BOLL_WEIGHT: f64 = 0.25;
pub const VOLUME_WEIGHT: f64 = 0.25;

const MARKET_STATE_THRESHOLD: f64 = 50.0;
const MACD_THRESHOLD: f64 = 60.0;
const BOLL_THRESHOLD: f64 = 50.0;
const VOLUME_THRESHOLD: f64 = 60.0;
const TOTAL_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct LayerScores {
    pub market_state: f64,
    pub macd: f64,
    pub boll: f64,
    pub volume: f64,
}

impl LayerScores {
    pub fn weighted_total(&self) -> f64 {
        MARKET_STATE_WEIGHT * self.market_state
            + MACD_WEIGHT * self.macd
            + BOLL_WEIGHT * self.boll
            + VOLUME_WEIGHT * self.volume
    }

    /// Every layer must clear its own threshold AND the weighted total must
    /// reach 70 for a candidate signal to survive.
    pub fn passes(&self) -> bool {
        self.market_state >= MARKET_STATE_THRESHOLD
            && self.macd >= MACD_THRESHOLD
            && self.boll >= BOLL_THRESHOLD
            && self.volume >= VOLUME_THRESHOLD
            && self.weighted_total() >= TOTAL_THRESHOLD
    }
}

/// `score = 100 * clamp((atrRatio - 0.005) / (0.05 - 0.005), 0, 1)`, plus a
/// 20-point bonus (capped at 100) when bandwidth sits in `[0.03, 0.15]`.
pub fn score_market_state(primary: &IndicatorSnapshot) -> f64 {
    let atr_ratio = primary.atr_ratio_price().unwrap_or(0.0);
    let mut score = 100.0 * ((atr_ratio - 0.005) / (0.05 - 0.005)).clamp(0.0, 1.0);
    if let Some(boll) = primary.boll {
        if (0.03..=0.15).contains(&boll.bandwidth) {
            score = (score + 20.0).min(100.0);
        }
    }
    score
}

/// 20 points each for `macd > signal`, `histogram > 0`, and the confirmation
/// timeframe agreeing on `macd > signal`; 30 points for no bearish
/// divergence; 10 points if the histogram grew versus the prior bar.
pub fn score_macd(
    primary: &IndicatorSnapshot,
    confirm: &IndicatorSnapshot,
    prev_histogram: Option<f64>,
) -> f64 {
    let (Some(p), Some(c)) = (primary.macd, confirm.macd) else {
        return 0.0;
    };
    let mut score = 0.0;
    if p.macd > p.signal {
        score += 20.0;
    }
    if p.histogram > 0.0 {
        score += 20.0;
    }
    if c.macd > c.signal {
        score += 20.0;
    }
    if !primary.macd_bearish_divergence {
        score += 30.0;
    }
    if prev_histogram.is_some_and(|prev| p.histogram > prev) {
        score += 10.0;
    }
    score
}

/// 50 if price sits in `(middle, upper)`, 30 if in `(lower, middle)`, else 0;
/// plus 50 if bandwidth is strictly inside `(0.03, 0.15)`.
pub fn score_boll(primary: &IndicatorSnapshot) -> f64 {
    let Some(boll) = primary.boll else {
        return 0.0;
    };
    let mut score = if primary.close > boll.middle && primary.close < boll.upper {
        50.0
    } else if primary.close > boll.lower && primary.close < boll.middle {
        30.0
    } else {
        0.0
    };
    if boll.bandwidth > 0.03 && boll.bandwidth < 0.15 {
        score += 50.0;
    }
    score
}

/// 30 for `volumeRatio >= 1.5`, +20 more for `>= 2.0`; 50 for a price-up /
/// volume-up or price-down / volume-dry confirmation.
pub fn score_volume(primary: &IndicatorSnapshot) -> f64 {
    let mut score = 0.0;
    if primary.volume_ratio >= 1.5 {
        score += 30.0;
    }
    if primary.volume_ratio >= 2.0 {
        score += 20.0;
    }
    if let Some(prev_close) = primary.prev_close {
        let delta = primary.close - prev_close;
        let price_up_volume_up = delta > 0.0 && primary.volume_ratio > 1.2;
        let price_down_volume_dry = delta < 0.0 && primary.volume_ratio < 0.8;
        if price_up_volume_up || price_down_volume_dry {
            score += 50.0;
        }
    }
    score
}

/// Sign agreement across timeframes for MACD direction, Bollinger
/// price-vs-middle position, and EMA20-vs-EMA50 order.
pub fn resonance_agrees(primary: &IndicatorSnapshot, confirm: &IndicatorSnapshot) -> bool {
    let macd_ok = match (primary.macd, confirm.macd) {
        (Some(p), Some(c)) => (p.macd > p.signal) == (c.macd > c.signal),
        _ => false,
    };
    let boll_ok = match (primary.boll, confirm.boll) {
        (Some(p), Some(c)) => (primary.close > p.middle) == (confirm.close > c.middle),
        _ => false,
    };
    let ema_ok = match (primary.ema20, primary.ema50, confirm.ema20, confirm.ema50) {
        (Some(p20), Some(p50), Some(c20), Some(c50)) => (p20 > p50) == (c20 > c50),
        _ => false,
    };
    macd_ok && boll_ok && ema_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{BollingerValue, MacdValue};

    fn snapshot(close: f64, volume_ratio: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            close,
            prev_close: Some(close - 1.0),
            atr: Some(1.0),
            volume_ratio,
            ..Default::default()
        }
    }

    #[test]
    fn market_state_score_zero_below_atr_floor() {
        let snap = snapshot(100.0, 1.0);
        assert_eq!(score_market_state(&snap), 0.0);
    }

    #[test]
    fn market_state_score_gets_bandwidth_bonus() {
        let mut snap = snapshot(100.0, 1.0);
        snap.atr = Some(2.0); // atrRatio = 0.02 -> mid-range
        snap.boll = Some(BollingerValue {
            middle: 100.0,
            upper: 105.0,
            lower: 95.0,
            bandwidth: 0.10,
        });
        let score = score_market_state(&snap);
        assert!(score > 0.0 && score <= 100.0);
    }

    #[test]
    fn macd_score_accumulates_each_component() {
        let mut primary = snapshot(100.0, 1.0);
        primary.macd = Some(MacdValue {
            macd: 1.0,
            signal: 0.5,
            histogram: 0.5,
        });
        let mut confirm = snapshot(100.0, 1.0);
        confirm.macd = Some(MacdValue {
            macd: 1.0,
            signal: 0.5,
            histogram: 0.5,
        });
        let score = score_macd(&primary, &confirm, Some(0.2));
        assert_eq!(score, 20.0 + 20.0 + 20.0 + 30.0 + 10.0);
    }

    #[test]
    fn boll_score_rewards_upper_half_and_mid_bandwidth() {
        let mut snap = snapshot(102.0, 1.0);
        snap.boll = Some(BollingerValue {
            middle: 100.0,
            upper: 105.0,
            lower: 95.0,
            bandwidth: 0.10,
        });
        assert_eq!(score_boll(&snap), 100.0);
    }

    #[test]
    fn volume_score_rewards_price_up_volume_up() {
        let snap = snapshot(105.0, 1.8);
        assert_eq!(score_volume(&snap), 30.0 + 50.0);
    }

    #[test]
    fn resonance_requires_all_three_to_agree() {
        let boll = BollingerValue {
            middle: 100.0,
            upper: 105.0,
            lower: 95.0,
            bandwidth: 0.1,
        };
        let macd = MacdValue {
            macd: 1.0,
            signal: 0.5,
            histogram: 0.5,
        };
        let primary = IndicatorSnapshot {
            close: 102.0,
            macd: Some(macd),
            boll: Some(boll),
            ema20: Some(101.0),
            ema50: Some(99.0),
            ..Default::default()
        };
        let confirm = primary.clone();
        assert!(resonance_agrees(&primary, &confirm));

        let mut disagreeing = confirm;
        disagreeing.ema20 = Some(90.0);
        disagreeing.ema50 = Some(99.0);
        assert!(!resonance_agrees(&primary, &disagreeing));
    }
}
