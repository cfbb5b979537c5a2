//! Order requests handed to the broker port.

use std::fmt;

use super::security::Security;

/// Target-quantity order: the broker trades whatever is needed to move the
/// position to `target_amount`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub security: Security,
    pub target_amount: i64,
    /// `None` for a market order.
    pub limit_price: Option<f64>,
}

impl OrderRequest {
    pub fn limit(security: Security, target_amount: i64, limit_price: f64) -> Self {
        OrderRequest {
            security,
            target_amount,
            limit_price: Some(limit_price),
        }
    }

    /// Market order to flatten the position.
    pub fn close(security: Security) -> Self {
        OrderRequest {
            security,
            target_amount: 0,
            limit_price: None,
        }
    }

    pub fn is_close(&self) -> bool {
        self.target_amount == 0
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit_price {
            Some(price) => write!(f, "{} -> {} @ {:.2}", self.security, self.target_amount, price),
            None => write!(f, "{} -> {} @ market", self.security, self.target_amount),
        }
    }
}
