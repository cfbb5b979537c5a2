//! Order submission and portfolio access port.

use crate::domain::error::LevelsError;
use crate::domain::order::OrderRequest;
use crate::domain::portfolio::PortfolioSnapshot;

pub trait BrokerPort {
    /// Submit a target-quantity order.
    fn place_order(&mut self, order: &OrderRequest) -> Result<(), LevelsError>;

    /// Cancel every order not yet filled.
    fn cancel_open_orders(&mut self);

    /// Current positions, cash and P&L.
    fn portfolio(&self) -> PortfolioSnapshot;
}
