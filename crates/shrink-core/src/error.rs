use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Failure raised by a [`crate::PdfRewriter`]
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),
}
