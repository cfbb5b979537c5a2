//! Daily loss cap.
//!
//! At the start of each day the current P&L is snapshotted. New entries are
//! halted while the day's P&L (current minus snapshot) is at or below
//! `-daily_risk_limit`. Closes are never blocked.

use tracing::warn;

pub const DEFAULT_DAILY_RISK: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskState {
    CanTrade,
    Halted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskManager {
    pub daily_risk_limit: f64,
    pub previous_day_pnl: f64,
    state: RiskState,
}

impl RiskManager {
    pub fn new(daily_risk_limit: f64) -> Self {
        RiskManager {
            daily_risk_limit,
            previous_day_pnl: 0.0,
            state: RiskState::CanTrade,
        }
    }

    pub fn start_of_day(&mut self, current_pnl: f64) {
        self.previous_day_pnl = current_pnl;
        self.state = RiskState::CanTrade;
    }

    /// P&L accumulated since the start-of-day snapshot.
    pub fn day_pnl(&self, current_pnl: f64) -> f64 {
        current_pnl - self.previous_day_pnl
    }

    /// Re-evaluate against the current P&L and return the new state.
    pub fn evaluate(&mut self, current_pnl: f64) -> RiskState {
        let day_pnl = self.day_pnl(current_pnl);
        let next = if day_pnl <= -self.daily_risk_limit {
            RiskState::Halted
        } else {
            RiskState::CanTrade
        };
        if next == RiskState::Halted && self.state == RiskState::CanTrade {
            warn!(day_pnl, limit = self.daily_risk_limit, "daily risk limit reached, halting entries");
        }
        self.state = next;
        next
    }

    pub fn state(&self) -> RiskState {
        self.state
    }

    pub fn can_trade(&self) -> bool {
        self.state == RiskState::CanTrade
    }
}

impl Default for RiskManager {
    fn default() -> Self {
        RiskManager::new(DEFAULT_DAILY_RISK)
    }
}
