//! Configuration validation.
//!
//! Missing keys take the strategy defaults; only values that are present
//! and out of range are rejected.

use crate::domain::error::LevelsError;
use crate::domain::level::{LevelFilterSettings, LEVEL_STEP_CENTS};
use crate::domain::position_manager::PositionSettings;
use crate::domain::risk::DEFAULT_DAILY_RISK;
use crate::domain::screener::ScreenerSettings;
use crate::ports::config_port::ConfigPort;

pub const STRATEGY: &str = "strategy";
pub const SCREENER: &str = "screener";

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), LevelsError> {
    let position = PositionSettings::default();
    validate_position_amount(config, position.position_amount)?;
    require_positive(config, STRATEGY, "stop_size", position.stop_size)?;
    require_positive(config, STRATEGY, "target_profit", position.target_profit)?;
    require_non_negative(config, STRATEGY, "cents_to_market", position.market_offset)?;
    require_positive(config, STRATEGY, "daily_risk", DEFAULT_DAILY_RISK)?;

    let level = LevelFilterSettings::default();
    validate_intraday_windows(config, &level)?;
    validate_cents_to_level(config, level.cents_to_level)?;
    Ok(())
}

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), LevelsError> {
    let defaults = ScreenerSettings::default();

    let strength = config.get_int(SCREENER, "daily_trend_strength", defaults.daily_trend_strength as i64);
    if strength < 1 {
        return Err(invalid(SCREENER, "daily_trend_strength", "daily_trend_strength must be at least 1"));
    }
    let trend_window = config.get_int(SCREENER, "trend_window", defaults.trend_window as i64);
    if trend_window < 2 {
        return Err(invalid(SCREENER, "trend_window", "trend_window must be at least 2"));
    }
    let average_window = config.get_int(SCREENER, "average_window", defaults.average_window as i64);
    if average_window < 1 {
        return Err(invalid(SCREENER, "average_window", "average_window must be at least 1"));
    }
    require_non_negative(config, SCREENER, "minimum_daily_volume", defaults.minimum_daily_volume)?;
    require_positive(config, SCREENER, "min_price", defaults.min_price)?;
    require_non_negative(config, SCREENER, "minimum_atr", defaults.minimum_atr)?;

    let min_price = config.get_double(SCREENER, "min_price", defaults.min_price);
    let max_price = config.get_double(SCREENER, "max_price", defaults.max_price);
    if max_price < min_price {
        return Err(invalid(SCREENER, "max_price", "max_price must not be below min_price"));
    }
    Ok(())
}

fn validate_position_amount(config: &dyn ConfigPort, default: i64) -> Result<(), LevelsError> {
    if config.get_int(STRATEGY, "position_amount", default) <= 0 {
        return Err(invalid(STRATEGY, "position_amount", "position_amount must be positive"));
    }
    Ok(())
}

fn validate_intraday_windows(
    config: &dyn ConfigPort,
    defaults: &LevelFilterSettings,
) -> Result<(), LevelsError> {
    let fast = config.get_int(STRATEGY, "intraday_trend_fast", defaults.fast_window as i64);
    let slow = config.get_int(STRATEGY, "intraday_trend_slow", defaults.slow_window as i64);
    if fast < 1 {
        return Err(invalid(STRATEGY, "intraday_trend_fast", "intraday_trend_fast must be at least 1"));
    }
    if slow <= fast {
        return Err(invalid(
            STRATEGY,
            "intraday_trend_slow",
            "intraday_trend_slow must be longer than intraday_trend_fast",
        ));
    }
    Ok(())
}

fn validate_cents_to_level(config: &dyn ConfigPort, default: f64) -> Result<(), LevelsError> {
    let cents = config.get_double(STRATEGY, "intraday_cents_to_level", default);
    if !(0.0..LEVEL_STEP_CENTS).contains(&cents) {
        return Err(invalid(
            STRATEGY,
            "intraday_cents_to_level",
            "intraday_cents_to_level must be between 0 and 25",
        ));
    }
    Ok(())
}

fn require_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), LevelsError> {
    let value = config.get_double(section, key, default);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(section, key, &format!("{} must be positive", key)));
    }
    Ok(())
}

fn require_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), LevelsError> {
    let value = config.get_double(section, key, default);
    if value < 0.0 || !value.is_finite() {
        return Err(invalid(section, key, &format!("{} must be non-negative", key)));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> LevelsError {
    LevelsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
