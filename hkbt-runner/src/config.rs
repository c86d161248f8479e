//! `BacktestRequest`: the serializable input schema (spec.md §6), loadable
//! from a TOML file or constructed directly by an embedding caller.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use hkbt_core::domain::{Interval, StrategyTag};

use crate::error::RunError;

/// Which strategy the request restricts the run to. `Adaptive` is the
/// default: regime classification picks whichever of the three strategies
/// is home for the bar (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyChoice {
    Macd,
    Boll,
    Volume,
    Adaptive,
}

impl StrategyChoice {
    pub fn as_filter(self) -> Option<StrategyTag> {
        match self {
            StrategyChoice::Macd => Some(StrategyTag::MacdTrend),
            StrategyChoice::Boll => Some(StrategyTag::BollReversion),
            StrategyChoice::Volume => Some(StrategyTag::VolumeBreakout),
            StrategyChoice::Adaptive => None,
        }
    }
}

fn default_interval() -> Interval {
    Interval::M30
}

/// A single backtest request (spec.md §6). `commission_rate`/`slippage_rate`
/// are rate overrides, not absolute amounts — see `StrategyParams` below for
/// how they fold into a `SimulatorConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub strategy: StrategyChoice,
    #[serde(default = "default_interval")]
    pub interval: Interval,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub initial_capital: f64,
    #[serde(default)]
    pub commission_rate_override: Option<f64>,
    #[serde(default)]
    pub slippage_rate_override: Option<f64>,
    #[serde(default)]
    pub generate_detailed_report: bool,
}

impl BacktestRequest {
    /// Validates the invariants spec.md §7 calls out under
    /// `INVALID_ARGUMENT`: reversed date range, non-positive capital.
    /// Unknown strategy can't happen — `StrategyChoice` is a closed enum, so
    /// an unrecognized value fails at deserialization instead.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.end_time <= self.start_time {
            return Err(RunError::InvalidRequest(format!(
                "end_time {} must be after start_time {}",
                self.end_time, self.start_time
            )));
        }
        if self.initial_capital <= 0.0 {
            return Err(RunError::InvalidRequest(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        Ok(())
    }

    /// A deterministic hash of the request, used to tag a `BacktestResult`
    /// with the exact inputs it came from (spec.md §8's determinism
    /// property relies on this being reproducible).
    pub fn config_hash(&self) -> hkbt_core::domain::ConfigHash {
        let json = serde_json::to_string(self).expect("BacktestRequest always serializes");
        hkbt_core::domain::ConfigHash::from_hash(blake3::hash(json.as_bytes()))
    }
}
