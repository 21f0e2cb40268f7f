//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

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

    #[error("unknown frequency '{0}' (expected hourly, daily, weekly, monthly or annually)")]
    UnknownFrequency(String),

    #[error("missing data: {what} has no usable observations")]
    MissingData { what: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        SigtraderError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn missing_data(what: impl Into<String>) -> Self {
        SigtraderError::MissingData { what: what.into() }
    }

    /// True for the configuration family (bad or missing parameters).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SigtraderError::Configuration { .. }
                | SigtraderError::ConfigParse { .. }
                | SigtraderError::ConfigMissing { .. }
                | SigtraderError::ConfigInvalid { .. }
        )
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) | SigtraderError::Csv(_) | SigtraderError::Data { .. } => 1,
            SigtraderError::Configuration { .. }
            | SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::UnknownFrequency(_) => 3,
            SigtraderError::MissingData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
