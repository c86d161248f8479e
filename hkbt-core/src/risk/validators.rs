//! Pre-trade validation chain. Checks run in order and short-circuit on the
//! first failure; a failure is absorbed as `RISK_REJECTED`, never fatal.

#[derive(Debug, Clone, Copy)]
pub struct TradeContext {
    pub cash: f64,
    pub estimated_notional: f64,
    pub estimated_buy_fees: f64,
    pub max_single_position: f64,
    pub realized_loss_today: f64,
    pub total_capital: f64,
    pub max_daily_loss: f64,
    pub consecutive_losses: u32,
    pub consecutive_loss_limit: u32,
    pub current_drawdown: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskCheck {
    Passed,
    Rejected(&'static str),
}

impl RiskCheck {
    pub fn is_passed(&self) -> bool {
        matches!(self, RiskCheck::Passed)
    }
}

/// Run the five checks in order, short-circuiting on first failure.
pub fn validate_trade(ctx: &TradeContext) -> RiskCheck {
    if ctx.cash - ctx.estimated_notional - ctx.estimated_buy_fees < 0.0 {
        return RiskCheck::Rejected("post-trade cash would go negative");
    }
    if ctx.estimated_notional > ctx.max_single_position {
        return RiskCheck::Rejected("single-trade notional exceeds max single position");
    }
    if -ctx.realized_loss_today > ctx.max_daily_loss * ctx.total_capital {
        return RiskCheck::Rejected("today's realized loss exceeds the daily loss limit");
    }
    if ctx.consecutive_losses >= ctx.consecutive_loss_limit {
        return RiskCheck::Rejected("consecutive loss limit reached");
    }
    if ctx.current_drawdown > ctx.max_drawdown {
        return RiskCheck::Rejected("running drawdown exceeds max drawdown");
    }
    RiskCheck::Passed
}
