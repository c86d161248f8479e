//! `MarketDataSource`: the abstract collaborator the data pipeline fetches
//! raw candles and corporate actions from. Concrete broker connectors live
//! outside the core; this module owns only the trait and the retry policy.

use std::time::Duration;

use crate::corporate_actions::action::CorporateAction;
use crate::domain::candle::Candle;
use crate::domain::interval::Interval;

#[derive(Debug, Clone)]
pub enum SourceError {
    /// Transient failure (timeout, rate limit, empty page): worth retrying.
    Retryable(String),
    /// Non-retryable failure: surfaces as `SOURCE_UNAVAILABLE` immediately.
    Terminal(String),
}

pub trait MarketDataSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    ) -> Result<Vec<Candle>, SourceError>;

    fn fetch_corporate_actions(&self, symbol: &str) -> Result<Vec<CorporateAction>, SourceError>;
}

/// Injected in place of `std::thread::sleep` so retry backoff is testable
/// without real wall-clock delay.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {}
}

const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_ATTEMPTS: u32 = 3;

/// Fetch candles with exponential backoff at 1x/2x/3x the 1-second base.
/// A `Terminal` error or an empty result after all retries surfaces as
/// `SOURCE_UNAVAILABLE` to the caller.
pub fn fetch_candles_with_retry(
    source: &dyn MarketDataSource,
    sleeper: &dyn Sleeper,
    symbol: &str,
    interval: Interval,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<Vec<Candle>, String> {
    let mut last_error = String::from("no attempts made");
    for attempt in 1..=MAX_ATTEMPTS {
        match source.fetch_candles(symbol, interval, start, end) {
            Ok(candles) if !candles.is_empty() => return Ok(candles),
            Ok(_) => last_error = "empty result".to_string(),
            Err(SourceError::Terminal(reason)) => return Err(reason),
            Err(SourceError::Retryable(reason)) => last_error = reason,
        }
        if attempt < MAX_ATTEMPTS {
            sleeper.sleep(BASE_BACKOFF * attempt);
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FlakySource {
        fail_times: Cell<u32>,
    }

    impl MarketDataSource for FlakySource {
        fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: Interval,
            _start: chrono::NaiveDateTime,
            _end: chrono::NaiveDateTime,
        ) -> Result<Vec<Candle>, SourceError> {
            let remaining = self.fail_times.get();
            if remaining > 0 {
                self.fail_times.set(remaining - 1);
                return Err(SourceError::Retryable("timeout".into()));
            }
            Ok(vec![sample_candle()])
        }

        fn fetch_corporate_actions(&self, _symbol: &str) -> Result<Vec<CorporateAction>, SourceError> {
            Ok(vec![])
        }
    }

    fn sample_candle() -> Candle {
        use chrono::NaiveDate;
        Candle::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap(),
            100.0,
            101.0,
            99.0,
            100.0,
            1000,
            100_000.0,
        )
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let source = FlakySource { fail_times: Cell::new(2) };
        let result = fetch_candles_with_retry(
            &source,
            &NoopSleeper,
            "00700.HK",
            Interval::M30,
            sample_candle().timestamp,
            sample_candle().timestamp,
        );
        assert!(result.is_ok());
    }

    struct AlwaysTerminal;
    impl MarketDataSource for AlwaysTerminal {
        fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: Interval,
            _start: chrono::NaiveDateTime,
            _end: chrono::NaiveDateTime,
        ) -> Result<Vec<Candle>, SourceError> {
            Err(SourceError::Terminal("symbol not found".into()))
        }
        fn fetch_corporate_actions(&self, _symbol: &str) -> Result<Vec<CorporateAction>, SourceError> {
            Ok(vec![])
        }
    }

    #[test]
    fn terminal_error_surfaces_immediately_without_retry() {
        let result = fetch_candles_with_retry(
            &AlwaysTerminal,
            &NoopSleeper,
            "00700.HK",
            Interval::M30,
            sample_candle().timestamp,
            sample_candle().timestamp,
        );
        assert_eq!(result, Err("symbol not found".to_string()));
    }

    struct AlwaysEmpty;
    impl MarketDataSource for AlwaysEmpty {
        fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: Interval,
            _start: chrono::NaiveDateTime,
            _end: chrono::NaiveDateTime,
        ) -> Result<Vec<Candle>, SourceError> {
            Ok(vec![])
        }
        fn fetch_corporate_actions(&self, _symbol: &str) -> Result<Vec<CorporateAction>, SourceError> {
            Ok(vec![])
        }
    }

    #[test]
    fn empty_after_all_retries_is_an_error() {
        let result = fetch_candles_with_retry(
            &AlwaysEmpty,
            &NoopSleeper,
            "00700.HK",
            Interval::M30,
            sample_candle().timestamp,
            sample_candle().timestamp,
        );
        assert!(result.is_err());
    }
}
