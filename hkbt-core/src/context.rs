//! Collaborator aggregate and cooperative cancellation (spec.md §5, §6, §9).
//!
//! "Global singletons" in the source (shared registries, event publishers)
//! become explicitly injected collaborators threaded through constructors:
//! a single `Context` aggregate holds everything a run needs from the
//! outside world — the market data source, the persistent store, a clock,
//! and a cancellation token — so the simulator itself stays a pure value
//! transformation over `(PreparedData, config)`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::corporate_actions::action::CorporateAction;
use crate::data::source::MarketDataSource;
use crate::domain::candle::Candle;
use crate::domain::interval::Interval;

/// Cooperative cancellation, checked at each bar boundary in the replay loop
/// and between retries in the data pipeline (spec.md §5). Cheap to clone and
/// share across the batch-runner's worker tasks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Wall-clock access, injected so `reportGeneratedAt`/progress timestamps are
/// fakeable in tests without touching real time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }
}

/// The persistent store (spec.md §6): findCandles, saveCandles,
/// findLatestTimestamp, findCorporateActions, saveCorporateActions,
/// deleteCandlesOlderThan. An abstract collaborator only — persistent
/// storage is an explicit Non-goal of the core (spec.md §1); no concrete
/// implementation lives in this crate.
pub trait Store: Send + Sync {
    fn find_candles(
        &self,
        symbol: &str,
        interval: Interval,
        range: (NaiveDateTime, NaiveDateTime),
    ) -> Vec<Candle>;

    fn save_candles(&self, symbol: &str, interval: Interval, batch: &[Candle]);

    fn find_latest_timestamp(&self, symbol: &str, interval: Interval) -> Option<NaiveDateTime>;

    fn find_corporate_actions(&self, symbol: &str) -> Vec<CorporateAction>;

    fn save_corporate_actions(&self, symbol: &str, batch: &[CorporateAction]);

    fn delete_candles_older_than(&self, interval: Interval, cutoff: NaiveDateTime);
}

/// The full set of collaborators a backtest run is driven by.
pub struct Context {
    pub market_data: Arc<dyn MarketDataSource + Send + Sync>,
    pub store: Option<Arc<dyn Store>>,
    pub clock: Arc<dyn Clock>,
    pub cancel: CancelToken,
}

impl Context {
    pub fn new(market_data: Arc<dyn MarketDataSource + Send + Sync>) -> Self {
        Self {
            market_data,
            store: None,
            clock: Arc::new(SystemClock),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_trips_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.trip();
        assert!(clone.is_cancelled());
    }
}
