//! Compression session state machine
//!
//! ```text
//! Idle ──select──▶ Staged ──begin──▶ Compressing ──finish(ok)──▶ Succeeded
//!                    ▲                    │
//!                    │                    └──finish(err)──▶ Failed ──begin──▶ Compressing
//!                    └──────── select (from any state but Compressing) ◀──────┘
//! ```
//!
//! An attempt is split in three so the in-flight request does not borrow
//! the session: [`CompressorSession::begin_compression`] hands out a
//! [`PendingCompression`], which runs to an [`AttemptResult`] that is fed
//! back through [`CompressorSession::finish_compression`]. While an attempt
//! is out, `begin_compression` returns `None` and selections are refused.

use std::mem;

use tracing::{debug, error, info, warn};

use shrink_core::{
    compressed_name, decode_data_url, encode_data_url, reduction_percentage, CompressRequest,
};

use crate::error::{ClientError, ValidationError};
use crate::source::{Materializer, Transport};
use crate::status::{StatusMessage, COMPRESSION_FAILED};
use crate::validator::{self, CandidateFile, StagedFile};

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Staged,
    Compressing,
    Succeeded,
    Failed,
}

/// Result of a successful round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOutcome<H> {
    /// Download name, `compressed_<original name>`
    pub name: String,
    pub original_size: u64,
    /// As reported by the server; may exceed `original_size`
    pub compressed_size: u64,
    pub resource: H,
}

impl<H> CompressionOutcome<H> {
    pub fn reduction_percentage(&self) -> i64 {
        reduction_percentage(self.original_size, self.compressed_size)
    }
}

/// What happened to a file selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Staged,
    Rejected(ValidationError),
    /// An attempt is in flight; the selection was ignored
    Busy,
}

enum Phase<H> {
    Idle,
    Staged(StagedFile),
    Compressing(StagedFile),
    Succeeded(StagedFile, CompressionOutcome<H>),
    Failed(StagedFile),
}

/// Client state for one browser view
pub struct CompressorSession<H> {
    phase: Phase<H>,
    status: Option<StatusMessage>,
}

impl<H> Default for CompressorSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CompressorSession<H> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            status: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Staged(_) => SessionState::Staged,
            Phase::Compressing(_) => SessionState::Compressing,
            Phase::Succeeded(..) => SessionState::Succeeded,
            Phase::Failed(_) => SessionState::Failed,
        }
    }

    /// The staged file. Cleared while its attempt is in flight.
    pub fn staged_file(&self) -> Option<&StagedFile> {
        match &self.phase {
            Phase::Staged(file) | Phase::Succeeded(file, _) | Phase::Failed(file) => Some(file),
            Phase::Idle | Phase::Compressing(_) => None,
        }
    }

    pub fn outcome(&self) -> Option<&CompressionOutcome<H>> {
        match &self.phase {
            Phase::Succeeded(_, outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_compressing(&self) -> bool {
        matches!(self.phase, Phase::Compressing(_))
    }

    /// A file is staged, nothing is in flight and no result is showing
    pub fn can_compress(&self) -> bool {
        matches!(self.phase, Phase::Staged(_) | Phase::Failed(_))
    }

    /// Validate a selection and stage it.
    ///
    /// On acceptance the previous outcome and status are discarded. On
    /// rejection the staged file is kept and an error status explains why.
    pub fn select_file(&mut self, candidate: CandidateFile) -> SelectionOutcome {
        if self.is_compressing() {
            debug!("Ignoring selection of '{}' while compressing", candidate.name);
            return SelectionOutcome::Busy;
        }

        match validator::stage(candidate) {
            Ok(file) => {
                debug!("Staged '{}' ({} bytes)", file.name(), file.size());
                self.phase = Phase::Staged(file);
                self.status = None;
                SelectionOutcome::Staged
            }
            Err(err) => {
                debug!("Rejected selection: {:?}", err);
                self.status = Some(StatusMessage::error(err.to_string()));
                SelectionOutcome::Rejected(err)
            }
        }
    }

    /// Move to `Compressing` and hand out the attempt.
    ///
    /// Returns `None` (and changes nothing) unless a file is staged with
    /// no attempt in flight.
    pub fn begin_compression(&mut self) -> Option<PendingCompression> {
        let file = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Staged(file) | Phase::Failed(file) => file,
            other => {
                self.phase = other;
                return None;
            }
        };

        info!("Compressing '{}'", file.name());
        self.phase = Phase::Compressing(file.clone());
        self.status = None;
        Some(PendingCompression { file })
    }

    /// Record the result of an attempt started by `begin_compression`
    pub fn finish_compression(&mut self, attempt: AttemptResult<H>) {
        let in_flight = match &self.phase {
            Phase::Compressing(file) => file,
            _ => {
                warn!(
                    "Discarding result for '{}': no attempt in flight",
                    attempt.file.name()
                );
                return;
            }
        };
        if !in_flight.is_same_file(&attempt.file) {
            warn!(
                "Discarding result for '{}': another attempt is in flight",
                attempt.file.name()
            );
            return;
        }

        match attempt.result {
            Ok(outcome) => {
                let pct = outcome.reduction_percentage();
                info!(
                    "Compressed '{}': {} -> {} bytes ({}%)",
                    attempt.file.name(),
                    outcome.original_size,
                    outcome.compressed_size,
                    pct
                );
                self.status = Some(StatusMessage::compression_succeeded(pct));
                self.phase = Phase::Succeeded(attempt.file, outcome);
            }
            Err(err) => {
                error!("PDF compression failed: {}", err);
                self.status = Some(StatusMessage::error(COMPRESSION_FAILED));
                self.phase = Phase::Failed(attempt.file);
            }
        }
    }

    /// Run a whole attempt: begin, await the round trip, finish.
    ///
    /// Returns `false` without touching the transport when no attempt could
    /// be started.
    pub async fn compress<T, M>(&mut self, transport: &T, materializer: &M) -> bool
    where
        T: Transport + ?Sized,
        M: Materializer<Handle = H>,
    {
        let Some(pending) = self.begin_compression() else {
            return false;
        };
        let attempt = pending.run(transport, materializer).await;
        self.finish_compression(attempt);
        true
    }
}

/// An attempt that has been started but not yet run
#[derive(Debug)]
pub struct PendingCompression {
    file: StagedFile,
}

impl PendingCompression {
    /// Read, encode, send, decode, materialize
    pub async fn run<T, M>(self, transport: &T, materializer: &M) -> AttemptResult<M::Handle>
    where
        T: Transport + ?Sized,
        M: Materializer,
    {
        let result = self.execute(transport, materializer).await;
        AttemptResult {
            file: self.file,
            result,
        }
    }

    async fn execute<T, M>(
        &self,
        transport: &T,
        materializer: &M,
    ) -> Result<CompressionOutcome<M::Handle>, ClientError>
    where
        T: Transport + ?Sized,
        M: Materializer,
    {
        let bytes = self.file.source().read_bytes().await?;
        let request = CompressRequest::new(encode_data_url(&bytes));

        let response = transport.compress(&request).await?;

        let pdf = decode_data_url(&response.compressed_pdf)
            .map_err(|e| ClientError::Materialize(e.to_string()))?;
        let name = compressed_name(self.file.name());
        let resource = materializer.materialize(&name, pdf)?;

        Ok(CompressionOutcome {
            name,
            original_size: response.original_size,
            compressed_size: response.compressed_size,
            resource,
        })
    }
}

/// A finished attempt, ready for `finish_compression`
#[derive(Debug)]
pub struct AttemptResult<H> {
    file: StagedFile,
    result: Result<CompressionOutcome<H>, ClientError>,
}

impl<H> AttemptResult<H> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use shrink_core::limits::{MAX_UPLOAD_BYTES, PDF_MIME_TYPE};
    use shrink_core::CompressResponse;

    use crate::source::{FileSource, MemoryDownload, MemoryMaterializer};
    use crate::status::StatusKind;

    const MIB: u64 = 1024 * 1024;

    /// Replies with fixed sizes and echoes the uploaded document
    struct FakeService {
        calls: Cell<usize>,
        sizes: Option<(u64, u64)>,
        last_request: RefCell<Option<CompressRequest>>,
    }

    impl FakeService {
        fn echo() -> Self {
            Self {
                calls: Cell::new(0),
                sizes: None,
                last_request: RefCell::new(None),
            }
        }

        fn reporting(original: u64, compressed: u64) -> Self {
            Self {
                sizes: Some((original, compressed)),
                ..Self::echo()
            }
        }
    }

    #[async_trait(?Send)]
    impl Transport for FakeService {
        async fn compress(
            &self,
            request: &CompressRequest,
        ) -> Result<CompressResponse, ClientError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_request.borrow_mut() = Some(request.clone());

            let url = request.pdf_base64.clone().unwrap_or_default();
            let len = decode_data_url(&url).map(|b| b.len() as u64).unwrap_or(0);
            let (original_size, compressed_size) = self.sizes.unwrap_or((len, len));
            Ok(CompressResponse {
                compressed_pdf: url,
                original_size,
                compressed_size,
            })
        }
    }

    struct FailingService {
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl Transport for FailingService {
        async fn compress(&self, _: &CompressRequest) -> Result<CompressResponse, ClientError> {
            self.calls.set(self.calls.get() + 1);
            Err(ClientError::Status {
                status: 500,
                message: "Error compressing PDF".into(),
            })
        }
    }

    struct GarbageService;

    #[async_trait(?Send)]
    impl Transport for GarbageService {
        async fn compress(&self, _: &CompressRequest) -> Result<CompressResponse, ClientError> {
            Ok(CompressResponse {
                compressed_pdf: "not a data url".into(),
                original_size: 10,
                compressed_size: 5,
            })
        }
    }

    struct UnreadableFile;

    #[async_trait(?Send)]
    impl FileSource for UnreadableFile {
        async fn read_bytes(&self) -> Result<Vec<u8>, ClientError> {
            Err(ClientError::FileRead("permission denied".into()))
        }
    }

    struct BrokenMaterializer;

    impl Materializer for BrokenMaterializer {
        type Handle = MemoryDownload;

        fn materialize(&self, _: &str, _: Vec<u8>) -> Result<MemoryDownload, ClientError> {
            Err(ClientError::Materialize("out of memory".into()))
        }
    }

    fn pdf(name: &str, bytes: &[u8]) -> CandidateFile {
        CandidateFile::from_bytes(name, PDF_MIME_TYPE, bytes.to_vec())
    }

    /// Declared size only; no bytes are allocated
    fn sized_pdf(name: &str, size: u64) -> CandidateFile {
        CandidateFile::new(name, PDF_MIME_TYPE, size, Rc::new(Vec::new()))
    }

    fn staged_session(candidate: CandidateFile) -> CompressorSession<MemoryDownload> {
        let mut session = CompressorSession::new();
        assert_eq!(session.select_file(candidate), SelectionOutcome::Staged);
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let session: CompressorSession<MemoryDownload> = CompressorSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.staged_file().is_none());
        assert!(session.status().is_none());
        assert!(!session.can_compress());
    }

    #[test]
    fn test_select_valid_file_stages_it() {
        let session = staged_session(sized_pdf("a.pdf", 2 * MIB));
        assert_eq!(session.state(), SessionState::Staged);
        let staged = session.staged_file().unwrap();
        assert_eq!(staged.name(), "a.pdf");
        assert_eq!(staged.size(), 2 * MIB);
        assert!(session.can_compress());
    }

    #[test]
    fn test_select_wrong_type_keeps_staged_file() {
        let mut session = staged_session(sized_pdf("a.pdf", 100));

        let outcome = session.select_file(CandidateFile::from_bytes(
            "photo.png",
            "image/png",
            vec![1, 2, 3],
        ));

        assert!(matches!(
            outcome,
            SelectionOutcome::Rejected(ValidationError::InvalidType { .. })
        ));
        assert_eq!(session.staged_file().unwrap().name(), "a.pdf");
        let status = session.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.message, "Please select a valid PDF file");
    }

    #[test]
    fn test_select_oversized_file_reports_limit() {
        let mut session: CompressorSession<MemoryDownload> = CompressorSession::new();
        let outcome = session.select_file(sized_pdf("big.pdf", MAX_UPLOAD_BYTES + 1));

        assert!(matches!(
            outcome,
            SelectionOutcome::Rejected(ValidationError::TooLarge { .. })
        ));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.status().unwrap().message, "File must not exceed 10MB");
    }

    #[test]
    fn test_valid_selection_clears_previous_error() {
        let mut session: CompressorSession<MemoryDownload> = CompressorSession::new();
        session.select_file(sized_pdf("big.pdf", MAX_UPLOAD_BYTES + 1));
        assert!(session.status().is_some());

        session.select_file(sized_pdf("ok.pdf", 10));
        assert!(session.status().is_none());
    }

    #[tokio::test]
    async fn test_staging_same_file_twice_is_idempotent() {
        let service = FakeService::echo();
        let mut session = staged_session(pdf("a.pdf", b"%PDF-1.7 a"));
        assert!(session.compress(&service, &MemoryMaterializer).await);
        assert!(session.outcome().is_some());

        for _ in 0..2 {
            assert_eq!(
                session.select_file(pdf("a.pdf", b"%PDF-1.7 a")),
                SelectionOutcome::Staged
            );
            assert_eq!(session.state(), SessionState::Staged);
            assert_eq!(session.staged_file().unwrap().name(), "a.pdf");
            assert_eq!(session.staged_file().unwrap().size(), 10);
            assert!(session.outcome().is_none());
            assert!(session.status().is_none());
        }
    }

    #[tokio::test]
    async fn test_two_mib_file_reports_fifty_percent() {
        let service = FakeService::reporting(2_097_152, 1_048_576);
        let mut session = staged_session(pdf("report.pdf", b"%PDF-1.7 body"));

        assert!(session.compress(&service, &MemoryMaterializer).await);

        assert_eq!(session.state(), SessionState::Succeeded);
        assert!(!session.is_compressing());
        let status = session.status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert!(status.message.contains("50%"), "{}", status.message);

        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.name, "compressed_report.pdf");
        assert_eq!(outcome.original_size, 2_097_152);
        assert_eq!(outcome.compressed_size, 1_048_576);
        assert_eq!(outcome.reduction_percentage(), 50);
        assert_eq!(outcome.resource.name, "compressed_report.pdf");
        assert_eq!(outcome.resource.bytes, b"%PDF-1.7 body".to_vec());
        assert!(!session.can_compress());
    }

    #[tokio::test]
    async fn test_request_carries_data_url_of_file() {
        let service = FakeService::echo();
        let mut session = staged_session(pdf("a.pdf", b"%PDF-1.7"));
        session.compress(&service, &MemoryMaterializer).await;

        let request = service.last_request.borrow().clone().unwrap();
        assert_eq!(
            request.pdf_base64.as_deref(),
            Some("data:application/pdf;base64,JVBERi0xLjc=")
        );
    }

    #[tokio::test]
    async fn test_growth_is_reported_not_rejected() {
        let service = FakeService::reporting(1000, 1100);
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));
        session.compress(&service, &MemoryMaterializer).await;

        assert_eq!(session.state(), SessionState::Succeeded);
        assert!(session.status().unwrap().message.contains("-10%"));
    }

    #[tokio::test]
    async fn test_zero_original_size_does_not_crash() {
        let service = FakeService::reporting(0, 0);
        let mut session = staged_session(pdf("empty.pdf", b""));
        session.compress(&service, &MemoryMaterializer).await;

        assert_eq!(session.state(), SessionState::Succeeded);
        assert!(session.status().unwrap().message.contains("0%"));
    }

    #[tokio::test]
    async fn test_oversized_file_never_reaches_service() {
        let service = FakeService::echo();
        let mut session: CompressorSession<MemoryDownload> = CompressorSession::new();
        session.select_file(sized_pdf("huge.pdf", 11 * MIB));

        assert!(!session.compress(&service, &MemoryMaterializer).await);
        assert_eq!(service.calls.get(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_service_failure_moves_to_failed_with_generic_message() {
        let service = FailingService {
            calls: Cell::new(0),
        };
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));

        assert!(session.compress(&service, &MemoryMaterializer).await);

        assert_eq!(session.state(), SessionState::Failed);
        assert!(!session.is_compressing());
        let status = session.status().unwrap();
        assert!(status.is_error());
        assert_eq!(status.message, COMPRESSION_FAILED);
        assert!(!status.message.contains("500"));
        // Retained for retry
        assert_eq!(session.staged_file().unwrap().name(), "a.pdf");
        assert!(session.can_compress());

        assert!(session.compress(&service, &MemoryMaterializer).await);
        assert_eq!(service.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_attempt() {
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));
        session.compress(&GarbageService, &MemoryMaterializer).await;

        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.status().unwrap().message, COMPRESSION_FAILED);
    }

    #[tokio::test]
    async fn test_materialization_failure_fails_attempt() {
        let service = FakeService::echo();
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));
        session.compress(&service, &BrokenMaterializer).await;

        assert_eq!(service.calls.get(), 1);
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.status().unwrap().message, COMPRESSION_FAILED);
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_without_request() {
        let service = FakeService::echo();
        let mut session = staged_session(CandidateFile::new(
            "locked.pdf",
            PDF_MIME_TYPE,
            100,
            Rc::new(UnreadableFile),
        ));
        session.compress(&service, &MemoryMaterializer).await;

        assert_eq!(service.calls.get(), 0);
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.status().unwrap().message, COMPRESSION_FAILED);
    }

    #[tokio::test]
    async fn test_second_trigger_while_compressing_is_noop() {
        let service = FakeService::echo();
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));

        let pending = session.begin_compression().unwrap();
        assert_eq!(session.state(), SessionState::Compressing);
        assert!(session.is_compressing());
        assert!(session.staged_file().is_none());
        assert!(!session.can_compress());

        assert!(session.begin_compression().is_none());
        assert!(!session.compress(&service, &MemoryMaterializer).await);
        assert_eq!(service.calls.get(), 0);

        let attempt = pending.run(&service, &MemoryMaterializer).await;
        assert_eq!(service.calls.get(), 1);
        session.finish_compression(attempt);
        assert_eq!(session.state(), SessionState::Succeeded);
    }

    #[tokio::test]
    async fn test_selection_while_compressing_is_refused() {
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));
        let pending = session.begin_compression().unwrap();

        assert_eq!(
            session.select_file(pdf("b.pdf", b"%PDF")),
            SelectionOutcome::Busy
        );
        assert_eq!(session.state(), SessionState::Compressing);

        let attempt = pending
            .run(&FakeService::echo(), &MemoryMaterializer)
            .await;
        session.finish_compression(attempt);
        assert_eq!(session.staged_file().unwrap().name(), "a.pdf");
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let mut session = staged_session(pdf("a.pdf", b"%PDF"));
        let pending = session.begin_compression().unwrap();
        let attempt = pending
            .run(&FakeService::echo(), &MemoryMaterializer)
            .await;
        assert!(attempt.is_ok());
        session.finish_compression(attempt);

        // A second result with nothing in flight changes nothing
        let mut other = staged_session(pdf("b.pdf", b"%PDF"));
        let late = other
            .begin_compression()
            .unwrap()
            .run(&FakeService::echo(), &MemoryMaterializer)
            .await;
        session.finish_compression(late);
        assert_eq!(session.outcome().unwrap().name, "compressed_a.pdf");
    }

    #[tokio::test]
    async fn test_foreign_result_is_discarded_while_compressing() {
        let mut session = staged_session(pdf("a.pdf", b"%PDF-a"));
        let mine = session.begin_compression().unwrap();

        // Same name and size, different selection
        let mut other = staged_session(pdf("a.pdf", b"%PDF-b"));
        let foreign = other
            .begin_compression()
            .unwrap()
            .run(&FakeService::echo(), &MemoryMaterializer)
            .await;
        session.finish_compression(foreign);

        assert_eq!(session.state(), SessionState::Compressing);
        assert!(session.outcome().is_none());
        assert!(session.status().is_none());

        let attempt = mine.run(&FakeService::echo(), &MemoryMaterializer).await;
        session.finish_compression(attempt);
        assert_eq!(session.state(), SessionState::Succeeded);
        assert_eq!(session.outcome().unwrap().resource.bytes, b"%PDF-a");
    }

    #[test]
    fn test_begin_without_file_is_noop() {
        let mut session: CompressorSession<MemoryDownload> = CompressorSession::new();
        assert!(session.begin_compression().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }
}
