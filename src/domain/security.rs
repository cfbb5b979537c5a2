//! Tradable security identity.

use std::fmt;

/// An opaque tradable identifier with a display symbol.
///
/// Equality and hashing cover both fields; two securities with the same
/// `sid` but different symbols are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Security {
    pub sid: u32,
    pub symbol: String,
}

impl Security {
    pub fn new(sid: u32, symbol: impl Into<String>) -> Self {
        Security {
            sid,
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Join symbols for log lines, e.g. `"AAPL, MSFT"`.
pub fn join_symbols<'a>(securities: impl IntoIterator<Item = &'a Security>) -> String {
    securities
        .into_iter()
        .map(|s| s.symbol.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
