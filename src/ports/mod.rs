//! Port traits implemented by the trading framework or by local adapters.

pub mod broker_port;
pub mod config_port;
pub mod data_port;
