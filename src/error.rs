#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Error};

/// Classification of every failure the encryption pipeline can report.
///
/// Errors travel as `anyhow::Error`; the class is recovered with
/// `error.downcast_ref::<JWEError>()` or [`JWEError::classify`].
#[derive(Debug, thiserror::Error)]
pub enum JWEError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid key format: {0}")]
    KeyFormat(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
}

impl JWEError {
    /// Find the classification attached to an error, if any.
    pub fn classify(error: &Error) -> Option<&JWEError> {
        error.downcast_ref::<JWEError>()
    }

    /// `true` for failures that are not the caller's fault.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            JWEError::Serialization(_) | JWEError::Entropy(_) | JWEError::Encryption(_)
        )
    }

    /// HTTP status code a transport should answer with.
    pub fn http_status(&self) -> u16 {
        if self.is_internal() {
            500
        } else {
            400
        }
    }
}
