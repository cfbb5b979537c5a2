//! Position snapshots as reported by the broker.

use std::fmt;

use super::security::Security;

/// Trading direction of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("long"),
            Side::Short => f.write_str("short"),
        }
    }
}

/// Per-security position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

/// A framework-owned position; read-only to the strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub security: Security,
    /// Signed share count.
    pub amount: i64,
    pub cost_basis: f64,
    pub last_sale_price: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.amount > 0
    }

    pub fn is_short(&self) -> bool {
        self.amount < 0
    }

    pub fn state(&self) -> PositionState {
        match self.amount {
            0 => PositionState::Flat,
            a if a > 0 => PositionState::Long,
            _ => PositionState::Short,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self.state() {
            PositionState::Flat => None,
            PositionState::Long => Some(Side::Long),
            PositionState::Short => Some(Side::Short),
        }
    }

    /// Unsigned value at the last sale price.
    pub fn market_value(&self) -> f64 {
        self.amount.unsigned_abs() as f64 * self.last_sale_price
    }

    /// Signed value at the last sale price.
    pub fn exposure(&self) -> f64 {
        self.amount as f64 * self.last_sale_price
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.amount as f64 * (self.last_sale_price - self.cost_basis)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} amount={} cost={:.2} last={:.2}",
            self.security, self.amount, self.cost_basis, self.last_sale_price
        )
    }
}
