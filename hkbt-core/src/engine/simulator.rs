//! The Backtest Simulator (spec.md §4.9): deterministic bar-by-bar replay
//! over a `PreparedData` slice.
//!
//! One simulator instance backtests one `(symbol, strategy config)` run to
//! completion. It owns the Portfolio; the data it replays is a read-only
//! borrow. Determinism (spec.md §8) falls out of the fact that every
//! collaborator here — `IndicatorEngine`, `SignalEngine`, `PositionSizer`,
//! `validate_trade` — is a pure function of its accumulated state and the
//! current bar, with no wall-clock or RNG input.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::commission::{compute as compute_commission, CommissionSchedule};
use crate::context::CancelToken;
use crate::data::prepared::PreparedData;
use crate::domain::candle::Candle;
use crate::domain::ids::IdGen;
use crate::domain::instrument::Instrument;
use crate::domain::interval::Interval;
use crate::domain::order::OrderSide;
use crate::domain::portfolio::Portfolio;
use crate::domain::signal::StrategyTag;
use crate::domain::trade::ExitReason;
use crate::indicators::{IndicatorEngine, IndicatorSnapshot};
use crate::risk::{validate_trade, PositionSizer, SizingInputs, TradeContext};
use crate::signals::strategies::TakeProfitPlan;
use crate::signals::{EvaluateContext, Regime, SignalEngine};

use super::accounting::{apply_entry, apply_exit, market_fill, SLIPPAGE_RATE};
use super::metrics::{self, BacktestMetrics};

/// Minutes spanned by the cross-timeframe confirmation bar (spec.md §4.5's
/// "120m confirmation").
const CONFIRM_WINDOW_MINUTES: i64 = 120;

/// Unresolved trailing-stop distance and regime-guard defaults mirror the
/// `TradeContext` defaults already exercised by `risk::validators`' tests.
const DEFAULT_MAX_DAILY_LOSS: f64 = 0.05;
const DEFAULT_CONSECUTIVE_LOSS_LIMIT: u32 = 3;
const DEFAULT_MAX_DRAWDOWN: f64 = 0.20;
/// Gain at which the trailing stop in §4.5's exit precedence engages.
const TRAILING_ENGAGE_GAIN: f64 = 0.05;
/// Consecutive off-regime bars before the regime-change exit fires.
const REGIME_CHANGE_BAR_LIMIT: u32 = 3;
const ROLLING_WIN_RATE_WINDOW: usize = 30;

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub initial_capital: f64,
    pub interval: Interval,
    pub max_single_position: f64,
    pub max_daily_loss: f64,
    pub consecutive_loss_limit: u32,
    pub max_drawdown: f64,
    pub slippage_rate: f64,
    pub commission_schedule: CommissionSchedule,
    /// Restricts the simulator to signals from one strategy (spec.md §6's
    /// `strategy` request field). `None` is the `ADAPTIVE` case: regime
    /// classification picks whichever of the three strategies is home for
    /// the bar, same as today.
    pub strategy_filter: Option<StrategyTag>,
}

impl SimulatorConfig {
    pub fn new(initial_capital: f64, interval: Interval, max_single_position: f64) -> Self {
        Self {
            initial_capital,
            interval,
            max_single_position,
            max_daily_loss: DEFAULT_MAX_DAILY_LOSS,
            consecutive_loss_limit: DEFAULT_CONSECUTIVE_LOSS_LIMIT,
            max_drawdown: DEFAULT_MAX_DRAWDOWN,
            slippage_rate: SLIPPAGE_RATE,
            commission_schedule: CommissionSchedule::default(),
            strategy_filter: None,
        }
    }

    pub fn with_strategy_filter(mut self, tag: Option<StrategyTag>) -> Self {
        self.strategy_filter = tag;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub portfolio: Portfolio,
    pub metrics: BacktestMetrics,
    pub rejected_signals: u64,
    pub cancelled: bool,
}

/// Open-position bookkeeping the exit-precedence machinery needs beyond
/// what `Position` itself carries (which strategy opened it, its
/// stop/take-profit plan, tiered-exit progress, and the regime-mismatch
/// streak for the regime-change exit).
struct TradeState {
    strategy: StrategyTag,
    entry_price: f64,
    entry_time: NaiveDateTime,
    entry_signal: Option<crate::domain::ids::SignalId>,
    stop_loss: f64,
    take_profit: TakeProfitPlan,
    original_quantity: u64,
    tiers_filled: Vec<bool>,
    trailing_engaged: bool,
    regime_mismatch_streak: u32,
}

/// Aggregates a run of primary-timeframe candles into one confirmation-
/// timeframe candle (spec.md §4.5's 120-minute confirmation bar). Falls
/// back to a 1:1 passthrough when the primary interval does not evenly
/// divide the confirmation window (e.g. daily bars).
struct ConfirmAggregator {
    group_size: usize,
    count: usize,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    turnover: f64,
    timestamp: NaiveDateTime,
}

impl ConfirmAggregator {
    fn new(primary_interval: Interval) -> Self {
        let group_size = primary_interval.bars_per(CONFIRM_WINDOW_MINUTES).unwrap_or(1);
        Self {
            group_size: group_size.max(1),
            count: 0,
            open: 0.0,
            high: f64::MIN,
            low: f64::MAX,
            close: 0.0,
            volume: 0,
            turnover: 0.0,
            timestamp: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    /// Feeds one primary-timeframe candle; returns the completed
    /// confirmation candle once `group_size` bars have accumulated.
    fn push(&mut self, candle: &Candle) -> Option<Candle> {
        if self.count == 0 {
            self.open = candle.open;
            self.high = candle.high;
            self.low = candle.low;
        } else {
            self.high = self.high.max(candle.high);
            self.low = self.low.min(candle.low);
        }
        self.close = candle.close;
        self.volume += candle.volume;
        self.turnover += candle.turnover;
        self.timestamp = candle.timestamp;
        self.count += 1;

        if self.count >= self.group_size {
            let completed = Candle::new(
                self.timestamp,
                self.open,
                self.high,
                self.low,
                self.close,
                self.volume,
                self.turnover,
            );
            self.count = 0;
            self.volume = 0;
            self.turnover = 0.0;
            Some(completed)
        } else {
            None
        }
    }
}

pub struct Simulator {
    config: SimulatorConfig,
    instrument: Instrument,
    id_gen: IdGen,
    signal_engine: SignalEngine,
    sizer: PositionSizer,
    primary_engine: IndicatorEngine,
    confirm_engine: IndicatorEngine,
    confirm_aggregator: ConfirmAggregator,
    confirm_snapshot: IndicatorSnapshot,
}

impl Simulator {
    pub fn new(config: SimulatorConfig, instrument: Instrument) -> Self {
        let primary_interval = config.interval;
        let sizer = PositionSizer::new(config.max_single_position);
        Self {
            config,
            instrument,
            id_gen: IdGen::new(),
            signal_engine: SignalEngine::new(),
            sizer,
            primary_engine: IndicatorEngine::new(),
            confirm_engine: IndicatorEngine::new(),
            confirm_aggregator: ConfirmAggregator::new(primary_interval),
            confirm_snapshot: IndicatorSnapshot::default(),
        }
    }

    fn feed_confirm(&mut self, candle: &Candle) {
        if let Some(confirm_candle) = self.confirm_aggregator.push(candle) {
            self.confirm_engine.update(&confirm_candle);
            self.confirm_snapshot = self.confirm_engine.snapshot(confirm_candle.close);
        }
    }

    /// Runs the full warm-up + backtest replay, returning the final
    /// Portfolio, its derived metrics, and a rejected-signal counter.
    pub fn run(&mut self, data: &PreparedData, cancel: &CancelToken) -> BacktestOutcome {
        let symbol = self.instrument.symbol.clone();
        let mut portfolio = Portfolio::new(self.config.initial_capital);

        for candle in data.get_warmup_data() {
            self.primary_engine.update(&candle.candle);
            self.feed_confirm(&candle.candle);
        }

        let mut trade_state: Option<TradeState> = None;
        let mut prev_primary_snapshot: Option<IndicatorSnapshot> = None;
        let mut current_day: Option<NaiveDate> = None;
        let mut realized_loss_today = 0.0_f64;
        let mut consecutive_losses: u32 = 0;
        let mut rejected_signals: u64 = 0;
        let mut cancelled = false;
        let mut last_bar: Option<Candle> = None;

        for candle in data.get_backtest_data() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let raw = candle.candle;
            let day = raw.timestamp.date();
            if current_day != Some(day) {
                current_day = Some(day);
                realized_loss_today = 0.0;
            }

            self.primary_engine.update(&raw);
            self.feed_confirm(&raw);
            let primary_snapshot = self.primary_engine.snapshot(raw.close);
            let regime = crate::signals::regime::classify(&primary_snapshot);

            if let Some(state) = trade_state.as_mut() {
                let fully_closed = Self::evaluate_exits(
                    &mut portfolio,
                    &self.id_gen,
                    &self.config,
                    &self.instrument,
                    &mut self.signal_engine,
                    state,
                    &raw,
                    &primary_snapshot,
                    regime,
                    &mut realized_loss_today,
                    &mut consecutive_losses,
                );
                if fully_closed {
                    trade_state = None;
                }
            }

            if trade_state.is_none() {
                let ctx = EvaluateContext {
                    symbol: &symbol,
                    primary: &primary_snapshot,
                    confirm: &self.confirm_snapshot,
                    prev_primary: prev_primary_snapshot.as_ref(),
                    candle: &raw,
                    generated_at: raw.timestamp,
                };
                let signal = self.signal_engine.evaluate(&self.id_gen, &ctx).filter(|s| {
                    match self.config.strategy_filter {
                        Some(tag) => s.strategy == tag,
                        None => true,
                    }
                });
                if let Some(signal) = signal {
                    let opened = Self::try_enter(
                        &mut portfolio,
                        &self.id_gen,
                        &self.config,
                        &self.instrument,
                        &self.sizer,
                        &self.signal_engine,
                        &signal,
                        &primary_snapshot,
                        consecutive_losses,
                        realized_loss_today,
                        raw.timestamp,
                    );
                    match opened {
                        Some(state) => trade_state = Some(state),
                        None => rejected_signals += 1,
                    }
                }
            }

            let mut marks = HashMap::new();
            marks.insert(symbol.clone(), raw.close);
            if let Some(position) = portfolio.get_position_mut(&symbol) {
                position.update_mark(raw.close, raw.timestamp);
            }
            let equity = portfolio.equity(&marks);
            portfolio.record_equity(raw.timestamp, equity);

            prev_primary_snapshot = Some(primary_snapshot);
            last_bar = Some(raw);
        }

        // Liquidate any still-open position at the last processed bar's
        // close so the trade ledger never carries a dangling open position.
        if let (Some(state), Some(last)) = (trade_state.as_ref(), last_bar) {
            let quantity = portfolio
                .get_position(&symbol)
                .map(|p| p.quantity)
                .unwrap_or(0);
            if quantity > 0 {
                Self::close_full(
                    &mut portfolio,
                    &self.id_gen,
                    &self.config,
                    &self.instrument,
                    &mut self.signal_engine,
                    state,
                    quantity,
                    last.close,
                    ExitReason::EndOfRun,
                    last.timestamp,
                    &mut realized_loss_today,
                    &mut consecutive_losses,
                );
            }
        }

        let metrics = metrics::compute(&portfolio, self.config.interval.bars_per_day());
        BacktestOutcome {
            portfolio,
            metrics,
            rejected_signals,
            cancelled,
        }
    }

    /// Applies §4.5's exit precedence for one bar. Returns `true` if the
    /// position is now fully flat.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_exits(
        portfolio: &mut Portfolio,
        id_gen: &IdGen,
        config: &SimulatorConfig,
        instrument: &Instrument,
        signal_engine: &mut SignalEngine,
        state: &mut TradeState,
        candle: &Candle,
        primary_snapshot: &IndicatorSnapshot,
        regime: Regime,
        realized_loss_today: &mut f64,
        consecutive_losses: &mut u32,
    ) -> bool {
        let Some(position) = portfolio.get_position(&instrument.symbol) else {
            return true;
        };
        if position.is_flat() {
            return true;
        }
        let quantity = position.quantity;
        let high_water_mark = position.high_water_mark;
        let unrealized_gain = if state.entry_price > 0.0 {
            (high_water_mark - state.entry_price) / state.entry_price
        } else {
            0.0
        };
        if unrealized_gain >= TRAILING_ENGAGE_GAIN {
            state.trailing_engaged = true;
        }

        // 1. Hard stop-loss: triggered by the bar's low.
        if candle.low <= state.stop_loss {
            Self::close_full(
                portfolio, id_gen, config, instrument, signal_engine, state, quantity, state.stop_loss,
                ExitReason::StopLoss, candle.timestamp, realized_loss_today, consecutive_losses,
            );
            return true;
        }

        // 2. Trailing stop: only once engaged, trailing the high-water-mark
        // at the same fractional distance as the original stop.
        if state.trailing_engaged {
            let stop_fraction = 1.0 - state.stop_loss / state.entry_price;
            let trailing_price = high_water_mark * (1.0 - stop_fraction);
            if candle.low <= trailing_price {
                Self::close_full(
                    portfolio, id_gen, config, instrument, signal_engine, state, quantity, trailing_price,
                    ExitReason::TrailingStop, candle.timestamp, realized_loss_today, consecutive_losses,
                );
                return true;
            }
        }

        // 3. Take-profit.
        match state.take_profit.clone() {
            TakeProfitPlan::Fixed(price) => {
                if candle.high >= price {
                    Self::close_full(
                        portfolio, id_gen, config, instrument, signal_engine, state, quantity, price,
                        ExitReason::TakeProfit, candle.timestamp, realized_loss_today, consecutive_losses,
                    );
                    return true;
                }
            }
            TakeProfitPlan::BandOrRsi { rsi_threshold } => {
                let touched_upper_band = primary_snapshot.boll.is_some_and(|b| candle.close >= b.upper);
                let overbought = primary_snapshot.rsi.is_some_and(|rsi| rsi > rsi_threshold);
                if touched_upper_band || overbought {
                    Self::close_full(
                        portfolio, id_gen, config, instrument, signal_engine, state, quantity, candle.close,
                        ExitReason::TakeProfit, candle.timestamp, realized_loss_today, consecutive_losses,
                    );
                    return true;
                }
            }
            TakeProfitPlan::Tiered(tiers) => {
                for (idx, (price, portion)) in tiers.iter().enumerate() {
                    if state.tiers_filled[idx] || candle.high < *price {
                        continue;
                    }
                    state.tiers_filled[idx] = true;
                    let remaining = portfolio
                        .get_position(&instrument.symbol)
                        .map(|p| p.quantity)
                        .unwrap_or(0);
                    if remaining == 0 {
                        break;
                    }
                    let tier_qty = instrument
                        .round_to_lot(state.original_quantity as f64 * portion)
                        .min(remaining);
                    if tier_qty == 0 {
                        continue;
                    }
                    let flat = Self::close_partial(
                        portfolio, id_gen, config, instrument, signal_engine, state, tier_qty, *price,
                        ExitReason::TakeProfit, candle.timestamp, realized_loss_today, consecutive_losses,
                    );
                    if flat {
                        return true;
                    }
                }
                if state.tiers_filled.iter().all(|f| *f) {
                    return portfolio
                        .get_position(&instrument.symbol)
                        .map(|p| p.is_flat())
                        .unwrap_or(true);
                }
            }
        }

        // 4. Regime-change exit: leaves the strategy's home regime for
        // `REGIME_CHANGE_BAR_LIMIT` consecutive bars.
        let home_regime = signal_engine.strategy(state.strategy).home_regime();
        if regime != home_regime {
            state.regime_mismatch_streak += 1;
        } else {
            state.regime_mismatch_streak = 0;
        }
        if state.regime_mismatch_streak >= REGIME_CHANGE_BAR_LIMIT {
            Self::close_full(
                portfolio, id_gen, config, instrument, signal_engine, state, quantity, candle.close,
                ExitReason::RegimeChange, candle.timestamp, realized_loss_today, consecutive_losses,
            );
            return true;
        }

        false
    }

    #[allow(clippy::too_many_arguments)]
    fn close_full(
        portfolio: &mut Portfolio,
        id_gen: &IdGen,
        config: &SimulatorConfig,
        instrument: &Instrument,
        signal_engine: &mut SignalEngine,
        state: &TradeState,
        quantity: u64,
        trigger_price: f64,
        reason: ExitReason,
        now: NaiveDateTime,
        realized_loss_today: &mut f64,
        consecutive_losses: &mut u32,
    ) {
        Self::close_partial(
            portfolio, id_gen, config, instrument, signal_engine, state, quantity, trigger_price, reason, now,
            realized_loss_today, consecutive_losses,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn close_partial(
        portfolio: &mut Portfolio,
        id_gen: &IdGen,
        config: &SimulatorConfig,
        instrument: &Instrument,
        signal_engine: &mut SignalEngine,
        state: &TradeState,
        quantity: u64,
        trigger_price: f64,
        reason: ExitReason,
        now: NaiveDateTime,
        realized_loss_today: &mut f64,
        consecutive_losses: &mut u32,
    ) -> bool {
        let Ok(order) = market_fill(
            id_gen,
            &config.commission_schedule,
            instrument,
            &instrument.symbol,
            OrderSide::Sell,
            quantity,
            trigger_price,
            config.slippage_rate,
            now,
        ) else {
            return false;
        };
        let (realized, flat) = apply_exit(
            portfolio, id_gen, &order, state.entry_time, state.entry_price, state.entry_signal, reason, now,
        );
        *realized_loss_today += realized;
        let won = realized >= 0.0;
        if won {
            *consecutive_losses = 0;
        } else {
            *consecutive_losses += 1;
        }
        signal_engine.record_trade_outcome(state.strategy, won);
        flat
    }

    #[allow(clippy::too_many_arguments)]
    fn try_enter(
        portfolio: &mut Portfolio,
        id_gen: &IdGen,
        config: &SimulatorConfig,
        instrument: &Instrument,
        sizer: &PositionSizer,
        signal_engine: &SignalEngine,
        signal: &crate::domain::signal::TradingSignal,
        primary_snapshot: &IndicatorSnapshot,
        consecutive_losses: u32,
        realized_loss_today: f64,
        now: NaiveDateTime,
    ) -> Option<TradeState> {
        if signal.side != OrderSide::Buy {
            return None;
        }
        let atr_ratio = primary_snapshot.atr_ratio_mean().unwrap_or(1.0);
        let (rolling_win_rate, rolling_sample_count) = {
            let recent: Vec<_> = portfolio
                .trades
                .iter()
                .rev()
                .take(ROLLING_WIN_RATE_WINDOW)
                .collect();
            let count = recent.len();
            let wins = recent.iter().filter(|t| t.is_winner()).count();
            let rate = if count > 0 { wins as f64 / count as f64 } else { 0.5 };
            (rate, count)
        };
        let inputs = SizingInputs {
            strength: signal.strength,
            atr_ratio,
            rolling_win_rate,
            rolling_sample_count,
        };
        let notional = sizer.target_notional(&inputs);
        let estimated_fees = compute_commission(
            &config.commission_schedule,
            OrderSide::Buy,
            signal.suggested_price,
            instrument.round_to_lot(notional / signal.suggested_price),
            instrument.is_etf,
        )
        .total();

        let risk_ctx = TradeContext {
            cash: portfolio.cash,
            estimated_notional: notional,
            estimated_buy_fees: estimated_fees,
            max_single_position: config.max_single_position,
            realized_loss_today,
            total_capital: config.initial_capital,
            max_daily_loss: config.max_daily_loss,
            consecutive_losses,
            consecutive_loss_limit: config.consecutive_loss_limit,
            current_drawdown: portfolio.current_drawdown(portfolio.equity(&HashMap::new())),
            max_drawdown: config.max_drawdown,
        };
        if !validate_trade(&risk_ctx).is_passed() {
            return None;
        }

        let quantity = sizer.size(signal.suggested_price, instrument, &inputs);
        if quantity == 0 {
            return None;
        }

        let order = market_fill(
            id_gen,
            &config.commission_schedule,
            instrument,
            &instrument.symbol,
            OrderSide::Buy,
            quantity,
            signal.suggested_price,
            config.slippage_rate,
            now,
        )
        .ok()?;
        apply_entry(portfolio, &order, Some(signal.id), now);

        let strategy = signal_engine.strategy(signal.strategy);
        let plan = strategy.stop_plan(order.executed_price, primary_snapshot.atr);
        let tiers_filled = match &plan.take_profit {
            TakeProfitPlan::Tiered(tiers) => vec![false; tiers.len()],
            _ => Vec::new(),
        };
        Some(TradeState {
            strategy: signal.strategy,
            entry_price: order.executed_price,
            entry_time: now,
            entry_signal: Some(signal.id),
            stop_loss: plan.stop_loss,
            take_profit: plan.take_profit,
            original_quantity: order.executed_quantity,
            tiers_filled,
            trailing_engaged: false,
            regime_mismatch_streak: 0,
        })
    }
}
