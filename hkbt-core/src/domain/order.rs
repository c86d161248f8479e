//! Order and its state machine (spec.md §4.7, §3).
//!
//! Allowed transitions: `CREATED -> SUBMITTED | CANCELLED`,
//! `SUBMITTED -> PARTIAL_FILLED | FILLED | REJECTED | CANCELLED`,
//! `PARTIAL_FILLED -> FILLED | CANCELLED`. Terminal: `FILLED`, `REJECTED`,
//! `CANCELLED`. An illegal transition fails with `INVALID_STATE_TRANSITION`
//! and does not mutate the order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::OrderId;
use crate::commission::CommissionBreakdown;
use crate::error::HkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Submitted,
    PartialFilled,
    Filled,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Created => &[Submitted, Cancelled],
            Submitted => &[PartialFilled, Filled, Rejected, Cancelled],
            PartialFilled => &[Filled, Cancelled],
            Filled | Rejected | Cancelled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Submitted => "SUBMITTED",
            OrderStatus::PartialFilled => "PARTIAL_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Multiple of lot size.
    pub quantity: u64,
    pub suggested_price: f64,
    pub executed_price: f64,
    pub executed_quantity: u64,
    pub commission: Option<CommissionBreakdown>,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
}

impl Order {
    pub fn new(
        id: OrderId,
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: u64,
        suggested_price: f64,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            suggested_price,
            executed_price: 0.0,
            executed_quantity: 0,
            commission: None,
            status: OrderStatus::Created,
            created_at,
        }
    }

    /// Attempt a state transition, failing without mutation on an illegal one.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), HkError> {
        if !self.status.allowed_next().contains(&to) {
            return Err(HkError::InvalidStateTransition {
                order_id: self.id.0,
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// Record a fill, transitioning to PARTIAL_FILLED or FILLED as appropriate.
    pub fn fill(
        &mut self,
        fill_qty: u64,
        fill_price: f64,
        commission: CommissionBreakdown,
    ) -> Result<(), HkError> {
        let total = self.executed_quantity + fill_qty;
        let target = if total >= self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartialFilled
        };
        self.transition(target)?;
        // weighted average executed price across partial fills
        let prior_notional = self.executed_price * self.executed_quantity as f64;
        self.executed_quantity = total;
        self.executed_price = (prior_notional + fill_price * fill_qty as f64) / total as f64;
        self.commission = Some(match self.commission.take() {
            Some(existing) => existing.combine(&commission),
            None => commission,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_order() -> Order {
        Order::new(
            OrderId(1),
            "00700.HK",
            OrderSide::Buy,
            OrderType::Market,
            200,
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn legal_transition_chain_succeeds() {
        let mut o = sample_order();
        o.transition(OrderStatus::Submitted).unwrap();
        o.transition(OrderStatus::Filled).unwrap();
        assert_eq!(o.status, OrderStatus::Filled);
    }

    #[test]
    fn illegal_transition_is_rejected_without_mutation() {
        let mut o = sample_order();
        let before = o.status;
        let err = o.transition(OrderStatus::Filled).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
        assert_eq!(o.status, before);
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        let mut o = sample_order();
        o.transition(OrderStatus::Cancelled).unwrap();
        assert!(o.transition(OrderStatus::Submitted).is_err());
    }

    #[test]
    fn partial_fill_then_full_fill() {
        let mut o = sample_order();
        o.transition(OrderStatus::Submitted).unwrap();
        let fee = CommissionBreakdown::zero();
        o.fill(100, 100.0, fee.clone()).unwrap();
        assert_eq!(o.status, OrderStatus::PartialFilled);
        o.fill(100, 101.0, fee).unwrap();
        assert_eq!(o.status, OrderStatus::Filled);
        assert_eq!(o.executed_quantity, 200);
        assert!((o.executed_price - 100.5).abs() < 1e-9);
    }
}
