//! Stateful compressor exposed to JavaScript
//!
//! Holds the whole session in Rust. JavaScript forwards the picked `File`,
//! awaits `compress()` and re-renders from the getters.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::File;

use shrink_client::{
    CandidateFile, CompressorSession, HttpTransport, SelectionOutcome, SessionState,
};
use shrink_core::format_megabytes;

use crate::browser::{BlobDownload, BlobUrlMaterializer, BrowserFile};

/// Single-file compression session bound to one service endpoint
#[wasm_bindgen]
pub struct PdfCompressor {
    session: Rc<RefCell<CompressorSession<BlobDownload>>>,
    transport: Rc<HttpTransport>,
}

#[wasm_bindgen]
impl PdfCompressor {
    /// Create a compressor. Without a base URL the page's own origin is used.
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: Option<String>) -> Result<PdfCompressor, JsValue> {
        let base = match base_url {
            Some(base) => base,
            None => web_sys::window()
                .ok_or_else(|| JsValue::from_str("No window"))?
                .location()
                .origin()?,
        };

        Ok(Self {
            session: Rc::new(RefCell::new(CompressorSession::new())),
            transport: Rc::new(HttpTransport::with_base_url(&base)),
        })
    }

    /// Offer a picked file. Returns true when it was staged.
    ///
    /// A rejected file leaves an error status; a file offered mid-request
    /// is ignored.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&self, file: File) -> bool {
        let candidate = CandidateFile::new(
            file.name(),
            file.type_(),
            file.size() as u64,
            Rc::new(BrowserFile::new(file)),
        );
        matches!(
            self.session.borrow_mut().select_file(candidate),
            SelectionOutcome::Staged
        )
    }

    /// Run one attempt. Resolves to false when none could be started.
    pub fn compress(&self) -> Promise {
        let session = Rc::clone(&self.session);
        let transport = Rc::clone(&self.transport);

        future_to_promise(async move {
            let Some(pending) = session.borrow_mut().begin_compression() else {
                return Ok(JsValue::FALSE);
            };
            let attempt = pending.run(&*transport, &BlobUrlMaterializer).await;
            session.borrow_mut().finish_compression(attempt);
            Ok(JsValue::TRUE)
        })
    }

    /// One of "idle", "staged", "compressing", "succeeded", "failed"
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.session.borrow().state()).to_string()
    }

    #[wasm_bindgen(getter, js_name = canCompress)]
    pub fn can_compress(&self) -> bool {
        self.session.borrow().can_compress()
    }

    #[wasm_bindgen(getter, js_name = isCompressing)]
    pub fn is_compressing(&self) -> bool {
        self.session.borrow().is_compressing()
    }

    #[wasm_bindgen(getter, js_name = statusMessage)]
    pub fn status_message(&self) -> Option<String> {
        self.session.borrow().status().map(|s| s.message.clone())
    }

    #[wasm_bindgen(getter, js_name = statusIsError)]
    pub fn status_is_error(&self) -> bool {
        self.session
            .borrow()
            .status()
            .map(|s| s.is_error())
            .unwrap_or(false)
    }

    #[wasm_bindgen(getter, js_name = stagedName)]
    pub fn staged_name(&self) -> Option<String> {
        self.session
            .borrow()
            .staged_file()
            .map(|f| f.name().to_string())
    }

    /// Staged file size as "x.xx MB"
    #[wasm_bindgen(getter, js_name = stagedSizeLabel)]
    pub fn staged_size_label(&self) -> Option<String> {
        self.session
            .borrow()
            .staged_file()
            .map(|f| format_megabytes(f.size()))
    }

    #[wasm_bindgen(getter, js_name = downloadName)]
    pub fn download_name(&self) -> Option<String> {
        self.session.borrow().outcome().map(|o| o.name.clone())
    }

    /// Object URL of the compressed document
    #[wasm_bindgen(getter, js_name = downloadUrl)]
    pub fn download_url(&self) -> Option<String> {
        self.session
            .borrow()
            .outcome()
            .map(|o| o.resource.url.clone())
    }

    #[wasm_bindgen(getter, js_name = originalSizeLabel)]
    pub fn original_size_label(&self) -> Option<String> {
        self.session
            .borrow()
            .outcome()
            .map(|o| format_megabytes(o.original_size))
    }

    #[wasm_bindgen(getter, js_name = compressedSizeLabel)]
    pub fn compressed_size_label(&self) -> Option<String> {
        self.session
            .borrow()
            .outcome()
            .map(|o| format_megabytes(o.compressed_size))
    }

    #[wasm_bindgen(getter, js_name = reductionPercentage)]
    pub fn reduction_percentage(&self) -> Option<i32> {
        self.session
            .borrow()
            .outcome()
            .map(|o| clamp_percentage(o.reduction_percentage()))
    }
}

/// Saturate into JS's 32-bit integer range; huge growth reads as `i32::MIN`
fn clamp_percentage(pct: i64) -> i32 {
    i32::try_from(pct).unwrap_or(if pct < 0 { i32::MIN } else { i32::MAX })
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Staged => "staged",
        SessionState::Compressing => "compressing",
        SessionState::Succeeded => "succeeded",
        SessionState::Failed => "failed",
    }
}
