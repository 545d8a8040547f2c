//! Error types for the response credit core.

use thiserror::Error;

/// Errors raised while converting credits to and from their stored form.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

impl CoreError {
    /// True if this error came from reading stored bytes.
    pub fn is_decoding(&self) -> bool {
        matches!(self, CoreError::DecodingError(_))
    }
}
