//! CorporateAction and per-event backward-adjustment factor formulas
//! (spec.md §3, §4.2).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Dividend { per_share: f64 },
    Split { ratio: f64 },
    Merge { ratio: f64 },
    Bonus { base: f64, extra: f64 },
    RightsIssue { base: f64, extra: f64, price: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorporateAction {
    pub symbol_ex_date: NaiveDate,
    pub kind: ActionKind,
}

impl CorporateAction {
    pub fn new(ex_date: NaiveDate, kind: ActionKind) -> Self {
        Self {
            symbol_ex_date: ex_date,
            kind,
        }
    }

    /// The backward-adjustment factor for this single event, given the
    /// pre-close (the close of the last trading day strictly before the
    /// ex-date, from the unadjusted sequence).
    pub fn backward_factor(&self, pre_close: f64) -> f64 {
        match self.kind {
            ActionKind::Dividend { per_share } => (pre_close - per_share) / pre_close,
            ActionKind::Split { ratio } | ActionKind::Merge { ratio } => 1.0 / ratio,
            ActionKind::Bonus { base, extra } => base / (base + extra),
            ActionKind::RightsIssue { base, extra, price } => {
                (pre_close * base + extra * price) / ((base + extra) * pre_close)
            }
        }
    }
}
