//! Domain error types.
//!
//! Skip conditions (NaN history, insufficient cash, off-level windows) are
//! not errors; they are reported through return values and logs. This enum
//! covers failures that stop an operation outright.

/// Top-level error type for intraday-levels.
#[derive(Debug, thiserror::Error)]
pub enum LevelsError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("order rejected for {symbol}: {reason}")]
    Order { symbol: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&LevelsError> for std::process::ExitCode {
    fn from(err: &LevelsError) -> Self {
        let code: u8 = match err {
            LevelsError::Io(_) => 1,
            LevelsError::ConfigParse { .. }
            | LevelsError::ConfigMissing { .. }
            | LevelsError::ConfigInvalid { .. } => 2,
            LevelsError::Data { .. } => 3,
            LevelsError::NoData { .. } | LevelsError::InsufficientData { .. } => 5,
            LevelsError::Order { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
