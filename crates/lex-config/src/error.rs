//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema.
    #[error("failed to load config: {0}")]
    Figment(#[from] figment::Error),

    /// A value parsed but is unusable, e.g. a base URL without a host.
    #[error("invalid config value `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
