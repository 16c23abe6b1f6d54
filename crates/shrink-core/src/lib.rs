//! PDF size reduction core
//!
//! Shared by the browser client and the transformation server:
//! - `wire`: JSON bodies of `POST /api/compress`
//! - `codec`: base64 data URLs used to carry documents over the text transport
//! - `engine`: the [`PdfRewriter`] capability and its lopdf implementation
//! - `metrics` / `limits`: reduction percentage, display sizes, upload ceilings

pub mod codec;
pub mod engine;
pub mod error;
pub mod limits;
pub mod metrics;
pub mod wire;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use codec::{decode_data_url, encode_data_url};
pub use engine::{LopdfRewriter, PdfRewriter, RewriteOptions};
pub use error::{ShrinkError, TransformError};
pub use limits::{DEFAULT_BODY_LIMIT, MAX_UPLOAD_BYTES, PDF_MIME_TYPE};
pub use metrics::{format_megabytes, reduction_percentage};
pub use wire::{CompressRequest, CompressResponse, ErrorResponse};

/// Display name for a compressed copy of `name`
pub fn compressed_name(name: &str) -> String {
    format!("compressed_{}", name)
}
