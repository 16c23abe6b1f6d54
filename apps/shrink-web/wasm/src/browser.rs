//! Web API implementations of the client capabilities

use async_trait::async_trait;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, Url};

use shrink_client::{ClientError, FileSource, Materializer};
use shrink_core::PDF_MIME_TYPE;

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// A `File` picked through an input or drop zone
pub struct BrowserFile {
    file: File,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

#[async_trait(?Send)]
impl FileSource for BrowserFile {
    async fn read_bytes(&self) -> Result<Vec<u8>, ClientError> {
        let buffer = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|e| ClientError::FileRead(js_error_text(&e)))?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// Object URL for a compressed document, revoked when dropped
#[derive(Debug)]
pub struct BlobDownload {
    pub name: String,
    pub url: String,
}

impl Drop for BlobDownload {
    fn drop(&mut self) {
        if let Err(e) = Url::revoke_object_url(&self.url) {
            web_sys::console::warn_1(
                &format!("Failed to revoke {}: {}", self.url, js_error_text(&e)).into(),
            );
        }
    }
}

/// Wraps bytes in a PDF blob and hands out an object URL for it
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobUrlMaterializer;

impl Materializer for BlobUrlMaterializer {
    type Handle = BlobDownload;

    fn materialize(&self, name: &str, bytes: Vec<u8>) -> Result<BlobDownload, ClientError> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(bytes.as_slice()));

        let options = BlobPropertyBag::new();
        options.set_type(PDF_MIME_TYPE);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| ClientError::Materialize(js_error_text(&e)))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|e| ClientError::Materialize(js_error_text(&e)))?;

        Ok(BlobDownload {
            name: name.to_string(),
            url,
        })
    }
}
