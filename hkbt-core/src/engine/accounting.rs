//! Order lifecycle and fill bookkeeping (spec.md §4.7, §4.8, §4.9 step 2-3).
//!
//! Sits between the Simulator's per-bar decision loop and the Portfolio
//! ledger: turns a `(side, qty, reference price)` into a filled `Order`,
//! applying slippage and the HKEX fee schedule, and folds the fill into the
//! Portfolio's cash/position state.

use chrono::NaiveDateTime;

use crate::commission::{compute, CommissionBreakdown, CommissionSchedule};
use crate::domain::ids::{IdGen, SignalId};
use crate::domain::instrument::Instrument;
use crate::domain::order::{Order, OrderSide, OrderStatus, OrderType};
use crate::domain::portfolio::Portfolio;
use crate::domain::trade::{ExitReason, TradeRecord};
use crate::error::HkResult;

/// `+0.1%` against the trader on buys, `-0.1%` on sells (spec.md §9, §4.9).
pub const SLIPPAGE_RATE: f64 = 0.001;

pub fn apply_slippage(price: f64, side: OrderSide, slippage_rate: f64) -> f64 {
    match side {
        OrderSide::Buy => price * (1.0 + slippage_rate),
        OrderSide::Sell => price * (1.0 - slippage_rate),
    }
}

/// Build, submit, and immediately fully-fill a MARKET order against
/// `reference_price`. Returns the filled order (never partially filled —
/// the simulator only ever fills a whole lot-quantized order in one bar).
pub fn market_fill(
    id_gen: &IdGen,
    schedule: &CommissionSchedule,
    instrument: &Instrument,
    symbol: &str,
    side: OrderSide,
    quantity: u64,
    reference_price: f64,
    slippage_rate: f64,
    now: NaiveDateTime,
) -> HkResult<Order> {
    let executed_price = apply_slippage(reference_price, side, slippage_rate);
    let commission = compute(schedule, side, executed_price, quantity, instrument.is_etf);

    let mut order = Order::new(
        id_gen.next_order_id(),
        symbol,
        side,
        OrderType::Market,
        quantity,
        reference_price,
        now,
    );
    order.transition(OrderStatus::Submitted)?;
    order.fill(quantity, executed_price, commission)?;
    Ok(order)
}

/// Opens a new long position (or adds to an existing one at the same
/// symbol) from a filled buy order, deducting cash including commission.
pub fn apply_entry(portfolio: &mut Portfolio, order: &Order, entry_signal: Option<SignalId>, now: NaiveDateTime) {
    let notional = order.executed_price * order.executed_quantity as f64;
    let fees = order.commission.as_ref().map(CommissionBreakdown::total).unwrap_or(0.0);
    portfolio.cash -= notional + fees;

    match portfolio.get_position_mut(&order.symbol) {
        Some(position) if !position.is_flat() => position.add(order.executed_quantity, order.executed_price),
        _ => {
            let position = crate::domain::position::Position::open(
                order.symbol.clone(),
                order.executed_quantity,
                order.executed_price,
                now,
                entry_signal,
            );
            portfolio.positions.insert(order.symbol.clone(), position);
        }
    }
}

/// Closes (fully or partially) an open position from a filled sell order,
/// crediting cash net of commission and recording the realized `TradeRecord`.
/// Returns the realized P&L from this reduction and whether the position
/// closed out completely.
pub fn apply_exit(
    portfolio: &mut Portfolio,
    id_gen: &IdGen,
    order: &Order,
    entry_time: NaiveDateTime,
    entry_price: f64,
    entry_signal: Option<SignalId>,
    exit_reason: ExitReason,
    now: NaiveDateTime,
) -> (f64, bool) {
    let notional = order.executed_price * order.executed_quantity as f64;
    let fees = order.commission.as_ref().map(CommissionBreakdown::total).unwrap_or(0.0);
    portfolio.cash += notional - fees;

    let (realized, now_flat) = {
        let position = portfolio
            .get_position_mut(&order.symbol)
            .expect("exit order against a symbol with no open position");
        let realized = position.reduce(order.executed_quantity, order.executed_price);
        (realized, position.is_flat())
    };

    let trade = TradeRecord {
        id: id_gen.next_trade_id(),
        symbol: order.symbol.clone(),
        entry_time,
        exit_time: now,
        entry_price,
        exit_price: order.executed_price,
        quantity: order.executed_quantity,
        pnl: realized - fees,
        commission_paid: fees,
        entry_signal,
        exit_reason,
    };
    portfolio.trades.push(trade);

    (realized, now_flat)
}
