//! Upload and transport size limits shared by client and server.

/// The only media type accepted for upload
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Largest raw document a user may stage (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Server request body ceiling.
///
/// Must hold the JSON-wrapped data URL of a [`MAX_UPLOAD_BYTES`] document,
/// which base64 inflates by a third.
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Bytes of the `data:application/pdf;base64,` header
pub const DATA_URL_PREFIX_LEN: usize = "data:application/pdf;base64,".len();

/// Length of the data URL produced for `raw` bytes of input
pub fn encoded_len(raw: usize) -> usize {
    DATA_URL_PREFIX_LEN + raw.div_ceil(3) * 4
}
