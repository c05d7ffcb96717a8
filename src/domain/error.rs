//! Domain error types.

/// Top-level error type for sentinel.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

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

    #[error("failed to read {path}: {reason}")]
    DataSource { path: String, reason: String },

    #[error("price data error for {ticker}: {reason}")]
    PriceData { ticker: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SentinelError> for std::process::ExitCode {
    fn from(err: &SentinelError) -> Self {
        let code: u8 = match err {
            SentinelError::Io(_) => 1,
            SentinelError::ConfigParse { .. }
            | SentinelError::ConfigMissing { .. }
            | SentinelError::ConfigInvalid { .. } => 2,
            SentinelError::Database { .. } | SentinelError::DatabaseQuery { .. } => 3,
            SentinelError::DataSource { .. } | SentinelError::PriceData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
