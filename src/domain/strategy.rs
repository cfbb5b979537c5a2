//! Intraday levels strategy: the per-tick driver.
//!
//! Each day `before_trading_start` takes the screen output, picks the long
//! and short candidates and snapshots the risk manager. Every bar,
//! `handle_bar` cancels unfilled orders, closes positions on both sides
//! whose stop or target was hit, then, while the daily loss cap allows,
//! opens new positions on candidates whose intraday window is pinned to a
//! level, and records the account.
//! `close_positions` flattens everything before the close.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::domain::level::{LevelFilterSettings, LevelMatch, LevelProximityFilter, LevelRejection};
use crate::domain::order::OrderRequest;
use crate::domain::portfolio::{DailyRecord, PortfolioSnapshot};
use crate::domain::position::Side;
use crate::domain::position_manager::{EntrySkip, ExitReason, PositionManager, PositionSettings};
use crate::domain::price_window::Frequency;
use crate::domain::risk::{RiskManager, RiskState, DEFAULT_DAILY_RISK};
use crate::domain::screener::ScreenerOutput;
use crate::domain::security::{join_symbols, Security};
use crate::ports::broker_port::BrokerPort;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategySettings {
    pub level: LevelFilterSettings,
    pub position: PositionSettings,
    pub daily_risk: f64,
    pub daily_trend_strength: u32,
    pub intraday_frequency: Frequency,
}

impl Default for StrategySettings {
    fn default() -> Self {
        StrategySettings {
            level: LevelFilterSettings::default(),
            position: PositionSettings::default(),
            daily_risk: DEFAULT_DAILY_RISK,
            daily_trend_strength: 2,
            intraday_frequency: Frequency::Minute,
        }
    }
}

/// What happened during one `handle_bar` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub risk_state: RiskState,
    pub closes: Vec<(Security, ExitReason)>,
    pub entries: Vec<OrderRequest>,
    /// Orders the broker refused.
    pub rejected: Vec<Security>,
    /// Account state after the tick's orders were submitted.
    pub record: DailyRecord,
}

impl TickReport {
    fn new(risk_state: RiskState) -> Self {
        TickReport {
            risk_state,
            closes: Vec::new(),
            entries: Vec::new(),
            rejected: Vec::new(),
            record: DailyRecord::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntradayLevels {
    pub settings: StrategySettings,
    filter: LevelProximityFilter,
    positions: PositionManager,
    risk: RiskManager,
    longs: BTreeSet<Security>,
    shorts: BTreeSet<Security>,
}

impl IntradayLevels {
    pub fn new(settings: StrategySettings) -> Self {
        IntradayLevels {
            filter: LevelProximityFilter::new(settings.level),
            positions: PositionManager::new(settings.position),
            risk: RiskManager::new(settings.daily_risk),
            longs: BTreeSet::new(),
            shorts: BTreeSet::new(),
            settings,
        }
    }

    pub fn candidates(&self, side: Side) -> &BTreeSet<Security> {
        match side {
            Side::Long => &self.longs,
            Side::Short => &self.shorts,
        }
    }

    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    /// Load the day's candidates and snapshot the P&L for the loss cap.
    pub fn before_trading_start(&mut self, screen: &ScreenerOutput, portfolio: &PortfolioSnapshot) {
        let strength = self.settings.daily_trend_strength;
        self.longs = screen.long_candidates(strength);
        self.shorts = screen.short_candidates(strength);
        self.risk.start_of_day(portfolio.pnl);

        info!(count = screen.rows.len(), "found securities to trade");
        info!("today's longs: {}", join_symbols(&self.longs));
        info!("today's shorts: {}", join_symbols(&self.shorts));
    }

    /// Run the level filter for one security against live history.
    pub fn scan(
        &self,
        side: Side,
        security: &Security,
        data: &dyn DataPort,
    ) -> Result<LevelMatch, LevelRejection> {
        let field = LevelProximityFilter::field_for(side);
        let frequency = self.settings.intraday_frequency;
        let level = &self.settings.level;

        let fast = data.history(security, field, level.fast_window, frequency);
        let slow = data.history(security, field, level.slow_window, frequency);
        let (fast, slow) = match (fast, slow) {
            (Ok(fast), Ok(slow)) => (fast, slow),
            (Err(e), _) | (_, Err(e)) => {
                warn!(symbol = %security, error = %e, "history unavailable");
                return Err(LevelRejection::MissingData);
            }
        };

        self.filter.evaluate(side, &fast, &slow)
    }

    pub fn handle_bar(&mut self, data: &dyn DataPort, broker: &mut dyn BrokerPort) -> TickReport {
        broker.cancel_open_orders();

        let portfolio = broker.portfolio();
        let risk_state = self.risk.evaluate(portfolio.pnl);
        let mut report = TickReport::new(risk_state);

        for side in [Side::Long, Side::Short] {
            self.close_side(side, &portfolio, broker, &mut report);
        }
        if risk_state == RiskState::CanTrade {
            for side in [Side::Long, Side::Short] {
                self.open_side(side, &portfolio, data, broker, &mut report);
            }
        }

        report.record = self.record(broker);
        report
    }

    fn close_side(
        &self,
        side: Side,
        portfolio: &PortfolioSnapshot,
        broker: &mut dyn BrokerPort,
        report: &mut TickReport,
    ) {
        for (order, reason) in self.positions.close_orders(side, portfolio) {
            let pnl = portfolio
                .get_position(&order.security)
                .map_or(0.0, |p| p.unrealized_pnl());
            debug!(symbol = %order.security, %reason, pnl, "closing position");
            match broker.place_order(&order) {
                Ok(()) => report.closes.push((order.security, reason)),
                Err(e) => {
                    warn!(symbol = %order.security, error = %e, "close rejected");
                    report.rejected.push(order.security);
                }
            }
        }
    }

    fn open_side(
        &self,
        side: Side,
        portfolio: &PortfolioSnapshot,
        data: &dyn DataPort,
        broker: &mut dyn BrokerPort,
        report: &mut TickReport,
    ) {
        let mut matches = Vec::new();
        for security in self.candidates(side) {
            if portfolio.has_position(security) || !data.can_trade(security) {
                continue;
            }
            match self.scan(side, security, data) {
                Ok(found) => matches.push((security, found)),
                Err(reason) => debug!(symbol = %security, %side, %reason, "no entry"),
            }
        }

        if matches.is_empty() {
            return;
        }
        let trend = match side {
            Side::Long => "up-trend",
            Side::Short => "down-trend",
        };
        debug!("{trend} stocks: {}", join_symbols(matches.iter().map(|(s, _)| *s)));

        for (security, found) in matches {
            let order = match self.positions.entry_order(side, security, found.extreme, portfolio) {
                Ok(order) => order,
                Err(EntrySkip::AlreadyOpen) => {
                    debug!(symbol = %security, "already have position");
                    continue;
                }
                Err(EntrySkip::InsufficientCash { required, cash }) => {
                    debug!(symbol = %security, required, cash, "not enough cash to open position");
                    continue;
                }
            };

            match broker.place_order(&order) {
                Ok(()) => {
                    info!(symbol = %security, %side, price = ?order.limit_price, "opening position");
                    report.entries.push(order);
                }
                Err(e) => {
                    warn!(symbol = %security, error = %e, "entry rejected");
                    report.rejected.push(security.clone());
                }
            }
        }
    }

    /// Flatten every open position and return the day's record.
    pub fn close_positions(&mut self, broker: &mut dyn BrokerPort) -> DailyRecord {
        let portfolio = broker.portfolio();
        for order in self.positions.flatten_orders(&portfolio) {
            if let Some(position) = portfolio.get_position(&order.security) {
                debug!(
                    position = %position,
                    reason = %ExitReason::EndOfDay,
                    pnl = position.unrealized_pnl(),
                    "closing position"
                );
            }
            if let Err(e) = broker.place_order(&order) {
                warn!(symbol = %order.security, error = %e, "end-of-day close rejected");
            }
        }
        self.record(broker)
    }

    pub fn record(&self, broker: &dyn BrokerPort) -> DailyRecord {
        let record = DailyRecord::from_snapshot(&broker.portfolio());
        debug!(
            leverage = record.leverage,
            pnl = record.pnl,
            cash = record.cash,
            long_count = record.long_count,
            short_count = record.short_count,
            "record"
        );
        record
    }
}

impl Default for IntradayLevels {
    fn default() -> Self {
        IntradayLevels::new(StrategySettings::default())
    }
}
