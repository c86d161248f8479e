//! HKEX commission schedule: six fee components, each computed on trade
//! value, bounded by a min/max, rounded individually to 2dp with banker's
//! rounding, then summed.

mod schedule;

pub use schedule::{compute, CommissionBreakdown, CommissionSchedule, FeeComponent};
