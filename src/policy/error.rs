//! Policy error type.

use thiserror::Error;

/// Errors from validating, persisting or loading a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("header value must not be empty while the header is enabled")]
    EmptyValue,

    #[error("header value is required")]
    MissingValue,

    #[error("not a valid on/off flag: {0:?}")]
    InvalidFlag(String),

    #[error("not a valid HTTP header value: {0:?}")]
    IllegalValue(String),

    #[error("policy storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode policy: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("failed to decode policy: {0}")]
    Decode(#[from] toml::de::Error),
}

impl PolicyError {
    /// True for errors caused by operator input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PolicyError::EmptyValue
                | PolicyError::MissingValue
                | PolicyError::InvalidFlag(_)
                | PolicyError::IllegalValue(_)
        )
    }
}
