//! Candle interval / bar size.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "60m")]
    M60,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    pub fn as_minutes(self) -> i64 {
        match self {
            Interval::M1 => 1,
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::M30 => 30,
            Interval::M60 => 60,
            Interval::D1 => 390, // one HK trading day: 09:30-12:00 + 13:00-16:00
        }
    }

    /// How many bars of `self` make up one bar of `other` (e.g. 4 30m bars
    /// per 120m confirmation bar). `None` if `other` is not an integer
    /// multiple of `self`.
    pub fn bars_per(self, other_minutes: i64) -> Option<usize> {
        if other_minutes % self.as_minutes() == 0 {
            Some((other_minutes / self.as_minutes()) as usize)
        } else {
            None
        }
    }

    /// Bars per HK trading day (330 minutes of session: 09:30-12:00 +
    /// 13:00-16:00), used for annualizing bar-level statistics. `D1` is one
    /// bar per day by definition.
    pub fn bars_per_day(self) -> f64 {
        const SESSION_MINUTES: f64 = 330.0;
        match self {
            Interval::D1 => 1.0,
            other => SESSION_MINUTES / other.as_minutes() as f64,
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::M60 => "60m",
            Interval::D1 => "1d",
        };
        write!(f, "{s}")
    }
}
