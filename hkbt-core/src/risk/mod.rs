//! Position sizing and the pre-trade validation chain.

mod sizer;
mod validators;

pub use sizer::{PositionSizer, SizingInputs};
pub use validators::{validate_trade, RiskCheck, TradeContext};
