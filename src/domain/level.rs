//! Quarter-dollar level proximity filter.
//!
//! A level is a price ending in .00, .25, .50 or .75. A long setup needs the
//! intraday lows to sit just above a level and stay pinned there; a short
//! setup needs the highs to sit just below one. The intraday trend (fast
//! mean vs slow mean) must agree with the side.

use super::position::Side;
use super::price_window::{PriceField, PriceWindow};

/// Distance between adjacent levels, in cents.
pub const LEVEL_STEP_CENTS: f64 = 25.0;

/// Tolerance for binary floating point error when comparing cent amounts.
pub const CENT_EPSILON: f64 = 1e-6;

/// Slack, in dollars, when comparing the fast and slow window means.
pub const MEAN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFilterSettings {
    /// Bars in the fast window; also the window the level is read from.
    pub fast_window: usize,
    pub slow_window: usize,
    /// Maximum distance to the level, and maximum spread of the window, in cents.
    pub cents_to_level: f64,
}

impl Default for LevelFilterSettings {
    fn default() -> Self {
        LevelFilterSettings {
            fast_window: 10,
            slow_window: 30,
            cents_to_level: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LevelRejection {
    #[error("history window is empty or contains NaN")]
    MissingData,

    #[error("intraday trend disagrees: fast mean {fast_mean:.4}, slow mean {slow_mean:.4}")]
    CounterTrend { fast_mean: f64, slow_mean: f64 },

    #[error("extreme is {cents:.2} cents from the level")]
    OffLevel { cents: f64 },

    #[error("window spreads {spread_cents:.2} cents from the extreme")]
    NotPinned { spread_cents: f64 },
}

/// A window that passed the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMatch {
    /// Minimum (long) or maximum (short) of the fast window.
    pub extreme: f64,
    /// Distance from the extreme to its level, in cents.
    pub cents_to_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelProximityFilter {
    pub settings: LevelFilterSettings,
}

impl LevelProximityFilter {
    pub fn new(settings: LevelFilterSettings) -> Self {
        LevelProximityFilter { settings }
    }

    /// The history field the filter reads for a side.
    pub fn field_for(side: Side) -> PriceField {
        match side {
            Side::Long => PriceField::Low,
            Side::Short => PriceField::High,
        }
    }

    pub fn evaluate(
        &self,
        side: Side,
        fast: &PriceWindow,
        slow: &PriceWindow,
    ) -> Result<LevelMatch, LevelRejection> {
        if fast.is_empty() || slow.is_empty() || fast.has_nan() || slow.has_nan() {
            return Err(LevelRejection::MissingData);
        }

        let fast_mean = fast.mean();
        let slow_mean = slow.mean();
        let against_trend = match side {
            Side::Long => fast_mean < slow_mean - MEAN_EPSILON,
            Side::Short => fast_mean > slow_mean + MEAN_EPSILON,
        };
        if against_trend {
            return Err(LevelRejection::CounterTrend {
                fast_mean,
                slow_mean,
            });
        }

        let (extreme, cents) = match side {
            Side::Long => {
                let low = fast.min().ok_or(LevelRejection::MissingData)?;
                (low, cents_above_level(low))
            }
            Side::Short => {
                let high = fast.max().ok_or(LevelRejection::MissingData)?;
                (high, cents_below_level(high))
            }
        };

        let tolerance = self.settings.cents_to_level + CENT_EPSILON;
        if cents > tolerance {
            return Err(LevelRejection::OffLevel { cents });
        }

        let spread_cents = fast
            .values
            .iter()
            .map(|p| (p - extreme).abs() * 100.0)
            .fold(0.0, f64::max);
        if spread_cents > tolerance {
            return Err(LevelRejection::NotPinned { spread_cents });
        }

        Ok(LevelMatch {
            extreme,
            cents_to_level: cents,
        })
    }
}

/// Cents above the nearest level at or below `price`.
pub fn cents_above_level(price: f64) -> f64 {
    let above = (price * 100.0).rem_euclid(LEVEL_STEP_CENTS);
    if LEVEL_STEP_CENTS - above < CENT_EPSILON {
        0.0
    } else {
        above
    }
}

/// Cents below the nearest level at or above `price`.
pub fn cents_below_level(price: f64) -> f64 {
    let above = cents_above_level(price);
    if above < CENT_EPSILON {
        0.0
    } else {
        LEVEL_STEP_CENTS - above
    }
}
