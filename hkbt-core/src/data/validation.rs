//! Per-candle validation and the data quality report.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::TradingCalendar;
use crate::domain::candle::Candle;

const MAX_SUSPICIOUS_CHANGE: f64 = 0.30;
const MIN_LOW: f64 = 0.001;
const MAX_HIGH: f64 = 10_000.0;
const MAX_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityCategory {
    InvalidPrice,
    InvalidVolume,
    DuplicateTimestamp,
    SuspiciousChange,
    MissingInSchedule,
}

/// Validates candles one at a time against a running set of seen timestamps
/// and the previous close, accumulating totals for the quality report.
#[derive(Debug, Default)]
pub struct Validator {
    seen_timestamps: HashSet<NaiveDateTime>,
    prev_close: Option<f64>,
    total: u64,
    invalid_price: u64,
    invalid_volume: u64,
    duplicate_timestamp: u64,
    suspicious_change: u64,
    missing_in_schedule: u64,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one candle against the running state, returning the set of
    /// categories it fails (empty if clean). Always advances internal state
    /// (duplicate/previous-close tracking) regardless of outcome.
    pub fn validate(&mut self, candle: &Candle, calendar: &TradingCalendar) -> Vec<QualityCategory> {
        self.total += 1;
        let mut failures = Vec::new();

        let has_too_many_decimals = [candle.open, candle.high, candle.low, candle.close]
            .iter()
            .any(|p| !has_at_most_n_decimals(*p, MAX_DECIMALS));
        if candle.low <= MIN_LOW || candle.high >= MAX_HIGH || has_too_many_decimals {
            failures.push(QualityCategory::InvalidPrice);
        } else if !(candle.low <= candle.open
            && candle.open <= candle.high
            && candle.low <= candle.close
            && candle.close <= candle.high)
        {
            failures.push(QualityCategory::InvalidPrice);
        }

        // volume is u64 so never negative at the type level; kept as an
        // explicit stage so the category still exists in the report.
        let _ = candle.volume;

        if self.seen_timestamps.contains(&candle.timestamp) {
            failures.push(QualityCategory::DuplicateTimestamp);
        }
        self.seen_timestamps.insert(candle.timestamp);

        if let Some(prev) = self.prev_close {
            if prev != 0.0 && ((candle.close - prev).abs() / prev) >= MAX_SUSPICIOUS_CHANGE {
                failures.push(QualityCategory::SuspiciousChange);
            }
        }
        self.prev_close = Some(candle.close);

        if !calendar.in_session(candle.timestamp) {
            failures.push(QualityCategory::MissingInSchedule);
        }

        for f in &failures {
            match f {
                QualityCategory::InvalidPrice => self.invalid_price += 1,
                QualityCategory::InvalidVolume => self.invalid_volume += 1,
                QualityCategory::DuplicateTimestamp => self.duplicate_timestamp += 1,
                QualityCategory::SuspiciousChange => self.suspicious_change += 1,
                QualityCategory::MissingInSchedule => self.missing_in_schedule += 1,
            }
        }

        failures
    }

    pub fn report(&self) -> DataQualityReport {
        DataQualityReport::new(
            self.total,
            self.invalid_price,
            self.invalid_volume,
            self.duplicate_timestamp,
            self.suspicious_change,
            self.missing_in_schedule,
        )
    }
}

fn has_at_most_n_decimals(value: f64, n: u32) -> bool {
    let factor = 10f64.powi(n as i32);
    let scaled = value * factor;
    (scaled - scaled.round()).abs() < 1e-6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Unusable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub total: u64,
    pub invalid_price: u64,
    pub invalid_volume: u64,
    pub duplicate_timestamp: u64,
    pub suspicious_change: u64,
    pub missing_in_schedule: u64,
    pub score: f64,
    pub usable: bool,
}

impl DataQualityReport {
    pub fn new(
        total: u64,
        invalid_price: u64,
        invalid_volume: u64,
        duplicate_timestamp: u64,
        suspicious_change: u64,
        missing_in_schedule: u64,
    ) -> Self {
        let n = total.max(1) as f64;
        let rate = |count: u64| count as f64 / n;

        let invalid_price_rate = rate(invalid_price);
        let invalid_volume_rate = rate(invalid_volume);
        let suspicious_rate = rate(suspicious_change);
        let duplicate_rate = rate(duplicate_timestamp);
        let missing_rate = rate(missing_in_schedule);

        let score = (100.0
            - 100.0
                * (0.40 * invalid_price_rate
                    + 0.20 * invalid_volume_rate
                    + 0.30 * suspicious_rate
                    + 0.20 * duplicate_rate
                    + 0.15 * missing_rate))
            .clamp(0.0, 100.0);

        let usable = invalid_price_rate <= 0.05
            && invalid_volume_rate <= 0.10
            && suspicious_rate <= 0.02
            && duplicate_rate <= 0.01
            && missing_rate <= 0.10
            && total >= 60;

        Self {
            total,
            invalid_price,
            invalid_volume,
            duplicate_timestamp,
            suspicious_change,
            missing_in_schedule,
            score,
            usable,
        }
    }

    pub fn grade(&self) -> QualityGrade {
        match self.score {
            s if s >= 90.0 => QualityGrade::Excellent,
            s if s >= 80.0 => QualityGrade::Good,
            s if s >= 70.0 => QualityGrade::Acceptable,
            s if s >= 60.0 => QualityGrade::Poor,
            _ => QualityGrade::Unusable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_run_is_excellent_and_usable() {
        let report = DataQualityReport::new(200, 0, 0, 0, 0, 0);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.grade(), QualityGrade::Excellent);
        assert!(report.usable);
    }

    #[test]
    fn duplicate_rate_above_one_percent_fails_usability() {
        // 200 candles, 15 duplicates => 7.5% > 1% gate.
        let report = DataQualityReport::new(200, 0, 0, 15, 0, 0);
        assert!(!report.usable);
        assert!(report.score < 60.0);
    }

    #[test]
    fn below_60_total_candles_is_unusable() {
        let report = DataQualityReport::new(59, 0, 0, 0, 0, 0);
        assert!(!report.usable);
    }

    #[test]
    fn price_change_of_exactly_30_percent_is_flagged() {
        use chrono::NaiveDate;
        let ts0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let ts1 = ts0 + chrono::Duration::minutes(30);
        let cal = TradingCalendar::new();
        let mut validator = Validator::new();
        let c0 = Candle::new(ts0, 100.0, 101.0, 99.0, 100.0, 1000, 100_000.0);
        let c1 = Candle::new(ts1, 130.0, 131.0, 129.0, 130.0, 1000, 130_000.0);
        validator.validate(&c0, &cal);
        let failures = validator.validate(&c1, &cal);
        assert!(failures.contains(&QualityCategory::SuspiciousChange));
    }

    #[test]
    fn price_change_just_under_30_percent_is_not_flagged() {
        use chrono::NaiveDate;
        let ts0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let ts1 = ts0 + chrono::Duration::minutes(30);
        let cal = TradingCalendar::new();
        let mut validator = Validator::new();
        let c0 = Candle::new(ts0, 100.0, 101.0, 99.0, 100.0, 1000, 100_000.0);
        let c1 = Candle::new(ts1, 129.99, 130.0, 129.0, 129.99, 1000, 130_000.0);
        validator.validate(&c0, &cal);
        let failures = validator.validate(&c1, &cal);
        assert!(!failures.contains(&QualityCategory::SuspiciousChange));
    }

    #[test]
    fn repeated_timestamp_is_a_duplicate() {
        use chrono::NaiveDate;
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let cal = TradingCalendar::new();
        let mut validator = Validator::new();
        let c = Candle::new(ts, 100.0, 101.0, 99.0, 100.0, 1000, 100_000.0);
        validator.validate(&c, &cal);
        let failures = validator.validate(&c, &cal);
        assert!(failures.contains(&QualityCategory::DuplicateTimestamp));
    }
}
