//! Entry pricing and stop/target exits.
//!
//! Per security the position moves FLAT -> LONG/SHORT on a limit entry and
//! back to FLAT on a stop, a target, or the end-of-day flatten. Exits are
//! always evaluated before entries on a tick.

use std::fmt;

use super::order::OrderRequest;
use super::portfolio::PortfolioSnapshot;
use super::position::{Position, PositionState, Side};
use super::security::Security;

/// Absorbs float error in stop/target comparisons (e.g. `10.00 - 0.05`).
pub const PRICE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSettings {
    /// Shares per entry.
    pub position_amount: i64,
    /// Added to the window low for a long limit, subtracted from the high for a short.
    pub market_offset: f64,
    /// Adverse move from cost basis that closes the position, in dollars.
    pub stop_size: f64,
    /// Favourable move from cost basis that closes the position, in dollars.
    pub target_profit: f64,
}

impl Default for PositionSettings {
    fn default() -> Self {
        PositionSettings {
            position_amount: 100,
            market_offset: 0.02,
            stop_size: 0.05,
            target_profit: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfDay,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop loss",
            ExitReason::TakeProfit => "take profit",
            ExitReason::EndOfDay => "end of day",
        };
        f.write_str(s)
    }
}

/// Why an entry was not submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySkip {
    AlreadyOpen,
    InsufficientCash { required: f64, cash: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionManager {
    pub settings: PositionSettings,
}

impl PositionManager {
    pub fn new(settings: PositionSettings) -> Self {
        PositionManager { settings }
    }

    /// Stop/target check for an open position at its last sale price.
    pub fn exit_reason(&self, position: &Position) -> Option<ExitReason> {
        let price = position.last_sale_price;
        let basis = position.cost_basis;
        let s = &self.settings;
        match position.state() {
            PositionState::Flat => None,
            PositionState::Long => {
                if price <= basis - s.stop_size + PRICE_EPSILON {
                    Some(ExitReason::StopLoss)
                } else if price >= basis + s.target_profit - PRICE_EPSILON {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
            PositionState::Short => {
                if price >= basis + s.stop_size - PRICE_EPSILON {
                    Some(ExitReason::StopLoss)
                } else if price <= basis - s.target_profit + PRICE_EPSILON {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
        }
    }

    /// Close orders for every open `side` position whose stop or target is hit.
    pub fn close_orders(
        &self,
        side: Side,
        portfolio: &PortfolioSnapshot,
    ) -> Vec<(OrderRequest, ExitReason)> {
        portfolio
            .open_positions()
            .into_iter()
            .filter(|p| p.side() == Some(side))
            .filter_map(|p| {
                self.exit_reason(p)
                    .map(|reason| (OrderRequest::close(p.security.clone()), reason))
            })
            .collect()
    }

    /// Close orders for every open position regardless of price.
    pub fn flatten_orders(&self, portfolio: &PortfolioSnapshot) -> Vec<OrderRequest> {
        portfolio
            .open_positions()
            .into_iter()
            .map(|p| OrderRequest::close(p.security.clone()))
            .collect()
    }

    /// Limit price for an entry off the window extreme.
    pub fn entry_price(&self, side: Side, extreme: f64) -> f64 {
        match side {
            Side::Long => extreme + self.settings.market_offset,
            Side::Short => extreme - self.settings.market_offset,
        }
    }

    pub fn entry_order(
        &self,
        side: Side,
        security: &Security,
        extreme: f64,
        portfolio: &PortfolioSnapshot,
    ) -> Result<OrderRequest, EntrySkip> {
        if portfolio.has_position(security) {
            return Err(EntrySkip::AlreadyOpen);
        }

        let price = self.entry_price(side, extreme);
        let required = price * self.settings.position_amount as f64;
        if required > portfolio.cash {
            return Err(EntrySkip::InsufficientCash {
                required,
                cash: portfolio.cash,
            });
        }

        Ok(OrderRequest::limit(
            security.clone(),
            side.sign() * self.settings.position_amount,
            price,
        ))
    }
}
