//! Error taxonomy shared by all pipeline stages.

/// Convenience result type used across Matchcard.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Corrupt or unsupported asset bytes; the message carries the underlying cause.
    #[error("decode error: {0}")]
    Decode(String),

    /// A required runtime capability (vector backend, usable font) is unavailable.
    #[error("missing capability: {0}")]
    MissingCapability(String),

    /// Invalid caller-provided data (empty buffers, bad parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CardError::MissingCapability`] value.
    pub fn missing_capability(msg: impl Into<String>) -> Self {
        Self::MissingCapability(msg.into())
    }

    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
