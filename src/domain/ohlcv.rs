//! OHLCV bar representation for daily and minute data.

use chrono::{NaiveDate, NaiveDateTime};

use super::price_window::PriceField;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Share volume; may be fractional.
    pub volume: f64,
}

impl OhlcvBar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
