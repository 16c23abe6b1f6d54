//! Client-side failure taxonomy
//!
//! Validation failures are reported to the user verbatim. Everything else
//! ends a compression attempt and is shown as one generic message; the
//! variant only reaches the logs.

use thiserror::Error;

/// Why a selected file was not staged. `Display` is the user-facing text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a valid PDF file")]
    InvalidType { media_type: String },

    #[error("File must not exceed 10MB")]
    TooLarge { size: u64 },
}

impl ValidationError {
    pub fn is_invalid_type(&self) -> bool {
        matches!(self, ValidationError::InvalidType { .. })
    }
}

/// Failure of one compression attempt
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Request to compression service failed: {0}")]
    Transport(String),

    #[error("Compression service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from compression service: {0}")]
    MalformedResponse(String),

    #[error("Failed to materialize downloadable file: {0}")]
    Materialize(String),
}

