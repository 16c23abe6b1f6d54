//! WASM bindings for the PDF shrink page
//!
//! The page keeps no state of its own:
//! - Validation and the compression state machine live in `shrink-client`
//! - `browser` supplies file reads and blob downloads from web APIs
//! - JavaScript only handles DOM events and rendering
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PdfCompressor } from './pkg/shrink_wasm.js';
//!
//! await init();
//!
//! const compressor = new PdfCompressor();
//! if (compressor.selectFile(input.files[0])) {
//!     await compressor.compress();
//! }
//! render(compressor.state, compressor.statusMessage, compressor.downloadUrl);
//! ```

pub mod browser;
pub mod compressor;

use wasm_bindgen::prelude::*;

pub use browser::{BlobDownload, BlobUrlMaterializer, BrowserFile};
pub use compressor::PdfCompressor;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Byte count as megabytes with two decimals, e.g. "1.50 MB"
#[wasm_bindgen(js_name = formatMegabytes)]
pub fn format_megabytes(bytes: f64) -> String {
    shrink_core::format_megabytes(bytes.max(0.0) as u64)
}
