//! Fixed-length price windows returned by the history port.

use std::fmt;

use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Minute,
    Daily,
}

impl Frequency {
    /// Suffix used in data file names, e.g. `AAPL_minute.csv`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Minute => "minute",
            Frequency::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of prices for one field at one frequency, most
/// recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    pub field: PriceField,
    pub frequency: Frequency,
    pub values: Vec<f64>,
}

impl PriceWindow {
    pub fn new(field: PriceField, frequency: Frequency, values: Vec<f64>) -> Self {
        PriceWindow {
            field,
            frequency,
            values,
        }
    }

    /// Build a window from the trailing `count` bars (fewer if not available).
    pub fn from_bars(
        bars: &[OhlcvBar],
        field: PriceField,
        frequency: Frequency,
        count: usize,
    ) -> Self {
        let start = bars.len().saturating_sub(count);
        let values = bars[start..].iter().map(|b| b.price(field)).collect();
        PriceWindow::new(field, frequency, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_nan(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }

    /// Arithmetic mean; NaN for an empty window.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}
