//! Portfolio snapshot and daily record.

use std::collections::HashMap;

use super::position::Position;
use super::security::Security;

/// Point-in-time view of the account, supplied by the broker port.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    /// Realized plus unrealized P&L since inception.
    pub pnl: f64,
    pub positions: HashMap<Security, Position>,
}

impl PortfolioSnapshot {
    pub fn new(cash: f64) -> Self {
        PortfolioSnapshot {
            cash,
            pnl: 0.0,
            positions: HashMap::new(),
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.security.clone(), position);
    }

    pub fn get_position(&self, security: &Security) -> Option<&Position> {
        self.positions.get(security).filter(|p| p.amount != 0)
    }

    pub fn has_position(&self, security: &Security) -> bool {
        self.get_position(security).is_some()
    }

    /// Open positions, ordered by sid for deterministic iteration.
    pub fn open_positions(&self) -> Vec<&Position> {
        let mut open: Vec<&Position> = self.positions.values().filter(|p| p.amount != 0).collect();
        open.sort_by_key(|p| p.security.sid);
        open
    }

    pub fn long_count(&self) -> usize {
        self.positions.values().filter(|p| p.is_long()).count()
    }

    pub fn short_count(&self) -> usize {
        self.positions.values().filter(|p| p.is_short()).count()
    }

    /// Gross exposure over net liquidation value; 0 when equity is not positive.
    pub fn leverage(&self) -> f64 {
        let gross: f64 = self.positions.values().map(|p| p.market_value()).sum();
        let net: f64 = self.positions.values().map(|p| p.exposure()).sum();
        let equity = self.cash + net;
        if equity > 0.0 { gross / equity } else { 0.0 }
    }
}

/// End-of-tick record of the account.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyRecord {
    pub long_count: usize,
    pub short_count: usize,
    pub pnl: f64,
    pub cash: f64,
    pub leverage: f64,
}

impl DailyRecord {
    pub fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        DailyRecord {
            long_count: snapshot.long_count(),
            short_count: snapshot.short_count(),
            pnl: snapshot.pnl,
            cash: snapshot.cash,
            leverage: snapshot.leverage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position(sid: u32, symbol: &str, amount: i64, price: f64) -> Position {
        Position {
            security: Security::new(sid, symbol),
            amount,
            cost_basis: price,
            last_sale_price: price,
        }
    }

    #[test]
    fn new_snapshot() {
        let snapshot = PortfolioSnapshot::new(100000.0);
        assert!((snapshot.cash - 100000.0).abs() < f64::EPSILON);
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.pnl, 0.0);
    }

    #[test]
    fn add_and_get_position() {
        let mut snapshot = PortfolioSnapshot::new(100000.0);
        snapshot.add_position(sample_position(1, "AAPL", 100, 10.0));

        let sec = Security::new(1, "AAPL");
        assert!(snapshot.has_position(&sec));
        assert_eq!(snapshot.get_position(&sec).unwrap().amount, 100);
    }

    #[test]
    fn zero_amount_is_not_a_position() {
        let mut snapshot = PortfolioSnapshot::new(100000.0);
        snapshot.add_position(sample_position(1, "AAPL", 0, 10.0));
        assert!(!snapshot.has_position(&Security::new(1, "AAPL")));
        assert!(snapshot.open_positions().is_empty());
    }

    #[test]
    fn counts_by_direction() {
        let mut snapshot = PortfolioSnapshot::new(100000.0);
        snapshot.add_position(sample_position(1, "AAPL", 100, 10.0));
        snapshot.add_position(sample_position(2, "MSFT", -100, 20.0));
        snapshot.add_position(sample_position(3, "XOM", 50, 30.0));
        assert_eq!(snapshot.long_count(), 2);
        assert_eq!(snapshot.short_count(), 1);
    }

    #[test]
    fn open_positions_sorted_by_sid() {
        let mut snapshot = PortfolioSnapshot::new(100000.0);
        snapshot.add_position(sample_position(9, "XOM", 50, 30.0));
        snapshot.add_position(sample_position(2, "MSFT", -100, 20.0));
        let sids: Vec<u32> = snapshot.open_positions().iter().map(|p| p.security.sid).collect();
        assert_eq!(sids, vec![2, 9]);
    }

    #[test]
    fn leverage_no_positions() {
        let snapshot = PortfolioSnapshot::new(100000.0);
        assert_eq!(snapshot.leverage(), 0.0);
    }

    #[test]
    fn leverage_long_and_short() {
        let mut snapshot = PortfolioSnapshot::new(8000.0);
        snapshot.add_position(sample_position(1, "AAPL", 100, 10.0));
        snapshot.add_position(sample_position(2, "MSFT", -50, 20.0));
        // gross 2000, net 0, equity 8000
        assert!((snapshot.leverage() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn daily_record_from_snapshot() {
        let mut snapshot = PortfolioSnapshot::new(9000.0);
        snapshot.pnl = -12.5;
        snapshot.add_position(sample_position(1, "AAPL", 100, 10.0));
        let record = DailyRecord::from_snapshot(&snapshot);
        assert_eq!(record.long_count, 1);
        assert_eq!(record.short_count, 0);
        assert!((record.pnl + 12.5).abs() < f64::EPSILON);
        assert!((record.cash - 9000.0).abs() < f64::EPSILON);
        assert!((record.leverage - 0.1).abs() < 1e-12);
    }
}
