//! Error types for QR synthesis.

use std::time::Duration;

use thiserror::Error;

/// Result type for QR synthesis operations.
pub type Result<T> = std::result::Result<T, QrError>;

/// Why a logo could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The logo bytes or data-URI could not be decoded into an image.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Decoding did not finish within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that can occur while generating a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    /// Empty content or invalid customization. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// The content cannot be encoded at any reachable version / ECC level.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The logo failed to decode or timed out.
    #[error("logo load error: {0}")]
    Load(#[from] LoadFailure),

    /// No drawable surface could be acquired. Fatal.
    #[error("render error: {0}")]
    Render(String),
}

impl QrError {
    /// Whether the fallback chain may absorb this error by degrading.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Load(_))
    }
}

impl From<qrcode::types::QrError> for QrError {
    fn from(err: qrcode::types::QrError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<image::ImageError> for QrError {
    fn from(err: image::ImageError) -> Self {
        Self::Render(err.to_string())
    }
}
