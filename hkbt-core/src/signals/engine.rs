//! Orchestrates regime classification, strategy dispatch, layer scoring, and
//! the per-strategy performance guard into a single per-bar decision.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDateTime;

use crate::domain::candle::Candle;
use crate::domain::ids::IdGen;
use crate::domain::signal::{StrategyTag, TradingSignal};
use crate::indicators::IndicatorSnapshot;

use super::layers::{score_boll, score_macd, score_market_state, score_volume, resonance_agrees, LayerScores};
use super::regime::{classify, Regime};
use super::strategies::{BollReversion, EntryContext, MacdTrend, Strategy, VolumeBreakout};

const PERFORMANCE_WINDOW: usize = 30;
const MIN_WIN_RATE: f64 = 0.30;
const CONSECUTIVE_LOSS_LIMIT: u32 = 3;
const RECOVERY_TRADES_NEEDED: u32 = 2;

pub struct EvaluateContext<'a> {
    pub symbol: &'a str,
    pub primary: &'a IndicatorSnapshot,
    pub confirm: &'a IndicatorSnapshot,
    pub prev_primary: Option<&'a IndicatorSnapshot>,
    pub candle: &'a Candle,
    pub generated_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct PerformanceTracker {
    recent_outcomes: VecDeque<bool>,
    consecutive_losses: u32,
    suppressed: bool,
    recovery_trades_remaining: u32,
}

impl PerformanceTracker {
    fn win_rate(&self) -> Option<f64> {
        if self.recent_outcomes.is_empty() {
            return None;
        }
        let wins = self.recent_outcomes.iter().filter(|&&won| won).count();
        Some(wins as f64 / self.recent_outcomes.len() as f64)
    }

    fn breaches_guard(&self) -> bool {
        self.win_rate().is_some_and(|rate| rate < MIN_WIN_RATE)
            || self.consecutive_losses >= CONSECUTIVE_LOSS_LIMIT
    }
}

/// Evaluates the four-layer filter and per-regime strategies and tracks each
/// strategy's trailing win rate to suppress a strategy on a cold streak.
pub struct SignalEngine {
    macd_trend: MacdTrend,
    boll_reversion: BollReversion,
    volume_breakout: VolumeBreakout,
    performance: HashMap<StrategyTag, PerformanceTracker>,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalEngine {
    pub fn new() -> Self {
        Self {
            macd_trend: MacdTrend,
            boll_reversion: BollReversion,
            volume_breakout: VolumeBreakout,
            performance: HashMap::new(),
        }
    }

    fn strategy_for_regime(&self, regime: Regime) -> Option<&dyn Strategy> {
        match regime {
            Regime::Trending => Some(&self.macd_trend),
            Regime::Ranging => Some(&self.boll_reversion),
            Regime::Breakout => Some(&self.volume_breakout),
            Regime::Neutral => None,
        }
    }

    /// Looks up the strategy implementation behind a tag, for callers (the
    /// simulator) that need its stop-loss/take-profit plan after entry.
    pub fn strategy(&self, tag: StrategyTag) -> &dyn Strategy {
        match tag {
            StrategyTag::MacdTrend => &self.macd_trend,
            StrategyTag::BollReversion => &self.boll_reversion,
            StrategyTag::VolumeBreakout => &self.volume_breakout,
        }
    }

    fn is_suppressed(&self, tag: StrategyTag) -> bool {
        self.performance.get(&tag).is_some_and(|t| t.suppressed)
    }

    /// Records the outcome of a closed trade. Feeds the originating
    /// strategy's rolling window and, on a win, counts down every suppressed
    /// strategy's recovery budget (the guard's "two positive trades have
    /// occurred from any source" release condition).
    pub fn record_trade_outcome(&mut self, strategy: StrategyTag, won: bool) {
        {
            let tracker = self.performance.entry(strategy).or_default();
            tracker.recent_outcomes.push_back(won);
            if tracker.recent_outcomes.len() > PERFORMANCE_WINDOW {
                tracker.recent_outcomes.pop_front();
            }
            if won {
                tracker.consecutive_losses = 0;
            } else {
                tracker.consecutive_losses += 1;
            }
            if !tracker.suppressed && tracker.breaches_guard() {
                tracker.suppressed = true;
                tracker.recovery_trades_remaining = RECOVERY_TRADES_NEEDED;
            }
        }

        if won {
            for tracker in self.performance.values_mut() {
                if tracker.suppressed && tracker.recovery_trades_remaining > 0 {
                    tracker.recovery_trades_remaining -= 1;
                    if tracker.recovery_trades_remaining == 0 {
                        tracker.suppressed = false;
                        tracker.consecutive_losses = 0;
                    }
                }
            }
        }
    }

    /// Evaluates at most one signal for this primary bar: classify regime,
    /// dispatch to its home strategy, require cross-timeframe resonance and
    /// all four scoring layers to pass.
    pub fn evaluate(&self, id_gen: &IdGen, ctx: &EvaluateContext) -> Option<TradingSignal> {
        let regime = classify(ctx.primary);
        let strategy = self.strategy_for_regime(regime)?;
        if self.is_suppressed(strategy.tag()) {
            return None;
        }

        let entry_ctx = EntryContext {
            primary: ctx.primary,
            confirm: ctx.confirm,
            prev_primary: ctx.prev_primary,
            candle: ctx.candle,
        };
        let candidate = strategy.entry(&entry_ctx)?;

        if !resonance_agrees(ctx.primary, ctx.confirm) {
            return None;
        }

        let prev_histogram = ctx.prev_primary.and_then(|p| p.macd).map(|m| m.histogram);
        let scores = LayerScores {
            market_state: score_market_state(ctx.primary),
            macd: score_macd(ctx.primary, ctx.confirm, prev_histogram),
            boll: score_boll(ctx.primary),
            volume: score_volume(ctx.primary),
        };
        if !scores.passes() {
            return None;
        }

        let layer_scores = HashMap::from([
            ("market_state".to_string(), scores.market_state),
            ("macd".to_string(), scores.macd),
            ("boll".to_string(), scores.boll),
            ("volume".to_string(), scores.volume),
        ]);

        Some(TradingSignal {
            id: id_gen.next_signal_id(),
            symbol: ctx.symbol.to_string(),
            strategy: strategy.tag(),
            side: candidate.side,
            suggested_price: candidate.suggested_price,
            strength: scores.weighted_total(),
            layer_scores,
            generated_at: ctx.generated_at,
        })
    }
}
