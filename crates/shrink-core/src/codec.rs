//! RFC 2397 data URLs carrying base64 PDF payloads
//!
//! The transport is a JSON text body, so documents travel as
//! `data:application/pdf;base64,<payload>` in both directions.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::ShrinkError;
use crate::limits::PDF_MIME_TYPE;

const BASE64_MARKER: &str = ";base64";

/// Wrap raw document bytes in a PDF data URL
pub fn encode_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", PDF_MIME_TYPE, STANDARD.encode(bytes))
}

/// Unwrap a base64 data URL back into raw bytes.
///
/// The media type in the header is not checked; browsers label files
/// inconsistently and the rewriter validates the document itself.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ShrinkError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| ShrinkError::InvalidDataUrl("missing 'data:' scheme".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ShrinkError::InvalidDataUrl("missing ',' separator".into()))?;

    if !header.ends_with(BASE64_MARKER) {
        return Err(ShrinkError::InvalidDataUrl(format!(
            "expected base64 encoding, got header '{}'",
            header
        )));
    }

    Ok(STANDARD.decode(payload)?)
}
