//! The six-component HKEX fee schedule.

use serde::{Deserialize, Serialize};

use crate::domain::order::OrderSide;
use crate::rounding::round2;

#[derive(Debug, Clone, Copy)]
pub struct FeeComponent {
    pub rate: f64,
    pub min: f64,
    pub max: Option<f64>,
}

impl FeeComponent {
    const fn new(rate: f64, min: f64, max: Option<f64>) -> Self {
        Self { rate, min, max }
    }

    /// Rate applied to `value`, bounded by `[min, max]`, rounded to 2dp
    /// (banker's rounding).
    fn charge(&self, value: f64) -> f64 {
        let raw = value * self.rate;
        let bounded = match self.max {
            Some(max) => raw.clamp(self.min, max),
            None => raw.max(self.min),
        };
        round2(bounded)
    }
}

/// The HKEX fee schedule. A `1.00` constant is frozen for stamp duty rather
/// than tracking year-to-year rule changes, to keep backtests reproducible.
#[derive(Debug, Clone, Copy)]
pub struct CommissionSchedule {
    pub commission: FeeComponent,
    pub trading_fee: FeeComponent,
    pub settlement_fee: FeeComponent,
    pub ccass_fee: FeeComponent,
    pub stamp_duty: FeeComponent,
    pub investor_compensation_fee: FeeComponent,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self {
            commission: FeeComponent::new(0.00025, 5.00, Some(100.00)),
            trading_fee: FeeComponent::new(0.00005, 0.01, Some(100.00)),
            settlement_fee: FeeComponent::new(0.00002, 2.00, Some(100.00)),
            ccass_fee: FeeComponent::new(0.00002, 2.00, Some(100.00)),
            stamp_duty: FeeComponent::new(0.0013, 1.00, None),
            investor_compensation_fee: FeeComponent::new(0.00002, 0.0, Some(100.00)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub commission: f64,
    pub stamp_duty: f64,
    pub trading_fee: f64,
    pub settlement_fee: f64,
    pub ccass_fee: f64,
    pub investor_compensation_fee: f64,
}

impl CommissionBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f64 {
        self.commission
            + self.stamp_duty
            + self.trading_fee
            + self.settlement_fee
            + self.ccass_fee
            + self.investor_compensation_fee
    }

    /// Combine two breakdowns component-wise (accumulating across partial fills).
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            commission: self.commission + other.commission,
            stamp_duty: self.stamp_duty + other.stamp_duty,
            trading_fee: self.trading_fee + other.trading_fee,
            settlement_fee: self.settlement_fee + other.settlement_fee,
            ccass_fee: self.ccass_fee + other.ccass_fee,
            investor_compensation_fee: self.investor_compensation_fee + other.investor_compensation_fee,
        }
    }
}

/// Compute the full breakdown for a trade of `qty * price = value`.
/// Stamp duty and the investor-compensation fee apply sell-side only; stamp
/// duty is additionally waived for ETFs.
pub fn compute(schedule: &CommissionSchedule, side: OrderSide, price: f64, qty: u64, is_etf: bool) -> CommissionBreakdown {
    let value = price * qty as f64;
    let is_sell = matches!(side, OrderSide::Sell);

    CommissionBreakdown {
        commission: schedule.commission.charge(value),
        trading_fee: schedule.trading_fee.charge(value),
        settlement_fee: schedule.settlement_fee.charge(value),
        ccass_fee: schedule.ccass_fee.charge(value),
        stamp_duty: if is_sell && !is_etf {
            schedule.stamp_duty.charge(value)
        } else {
            0.0
        },
        investor_compensation_fee: if is_sell {
            schedule.investor_compensation_fee.charge(value)
        } else {
            0.0
        },
    }
}
