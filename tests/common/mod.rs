#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use intraday_levels::adapters::replay_history::ReplayHistory;
use intraday_levels::domain::error::LevelsError;
pub use intraday_levels::domain::ohlcv::OhlcvBar;
use intraday_levels::domain::order::OrderRequest;
use intraday_levels::domain::portfolio::PortfolioSnapshot;
use intraday_levels::domain::position::Position;
use intraday_levels::domain::price_window::Frequency;
use intraday_levels::domain::screener::{ScreenerOutput, ScreenerRow};
use intraday_levels::domain::security::Security;
use intraday_levels::domain::trend::TrendState;
use intraday_levels::ports::broker_port::BrokerPort;
use std::collections::HashSet;

/// Records every order and serves a fixed portfolio.
pub struct MockBroker {
    pub portfolio: PortfolioSnapshot,
    pub orders: Vec<OrderRequest>,
    pub cancels: usize,
    pub reject: HashSet<String>,
}

impl MockBroker {
    pub fn new(cash: f64) -> Self {
        Self {
            portfolio: PortfolioSnapshot::new(cash),
            orders: Vec::new(),
            cancels: 0,
            reject: HashSet::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.portfolio.add_position(position);
        self
    }

    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.portfolio.pnl = pnl;
        self
    }

    pub fn rejecting(mut self, symbol: &str) -> Self {
        self.reject.insert(symbol.to_string());
        self
    }

    pub fn entries(&self) -> Vec<&OrderRequest> {
        self.orders.iter().filter(|o| !o.is_close()).collect()
    }

    pub fn closes(&self) -> Vec<&OrderRequest> {
        self.orders.iter().filter(|o| o.is_close()).collect()
    }
}

impl BrokerPort for MockBroker {
    fn place_order(&mut self, order: &OrderRequest) -> Result<(), LevelsError> {
        if self.reject.contains(&order.security.symbol) {
            return Err(LevelsError::Order {
                symbol: order.security.symbol.clone(),
                reason: "rejected by mock".into(),
            });
        }
        self.orders.push(order.clone());
        Ok(())
    }

    fn cancel_open_orders(&mut self) {
        self.cancels += 1;
    }

    fn portfolio(&self) -> PortfolioSnapshot {
        self.portfolio.clone()
    }
}

pub fn session_open() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 16)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn minute_bar(code: &str, index: usize, low: f64, high: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        timestamp: session_open() + chrono::Duration::minutes(index as i64),
        open: low,
        high,
        low,
        close: high,
        volume: 10_000.0,
    }
}

/// Minute bars from per-bar lows and highs.
pub fn minute_bars(code: &str, lows: &[f64], highs: &[f64]) -> Vec<OhlcvBar> {
    lows.iter()
        .zip(highs)
        .enumerate()
        .map(|(i, (&low, &high))| minute_bar(code, i, low, high))
        .collect()
}

/// `count` bars with constant low and high.
pub fn flat_bars(code: &str, count: usize, low: f64, high: f64) -> Vec<OhlcvBar> {
    minute_bars(code, &vec![low; count], &vec![high; count])
}

pub fn history_with(series: Vec<(Security, Vec<OhlcvBar>)>) -> ReplayHistory {
    let mut history = ReplayHistory::new();
    for (security, bars) in series {
        history.insert(security, Frequency::Minute, bars);
    }
    history
}

pub fn row(security: Security, long_streak: u32, short_streak: u32) -> ScreenerRow {
    ScreenerRow {
        security,
        average_volume: 2_000_000.0,
        sma_close: 20.0,
        average_range: 1.0,
        trend: TrendState {
            long_streak,
            short_streak,
        },
    }
}

pub fn screen(rows: Vec<ScreenerRow>) -> ScreenerOutput {
    ScreenerOutput {
        rows,
        ..ScreenerOutput::default()
    }
}

pub fn position(security: Security, amount: i64, cost_basis: f64, last_sale_price: f64) -> Position {
    Position {
        security,
        amount,
        cost_basis,
        last_sale_price,
    }
}
