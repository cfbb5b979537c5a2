//! Core domain types and logic.

pub mod security;
pub mod ohlcv;
pub mod price_window;
pub mod position;
pub mod portfolio;
pub mod order;
pub mod trend;
pub mod level;
pub mod position_manager;
pub mod risk;
pub mod screener;
pub mod strategy;
pub mod config_validation;
pub mod error;
