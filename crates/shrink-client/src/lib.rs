//! Client side of the PDF shrink pipeline
//!
//! Holds everything the browser view needs, independent of rendering:
//! - `validator`: type and size checks that gate staging
//! - `session`: the staged → compressing → succeeded/failed state machine
//! - `source`: capabilities the session awaits on (file read, transport,
//!   download materialization)
//! - `transport`: the HTTP implementation of [`Transport`]
//!
//! ## Usage
//!
//! ```no_run
//! use shrink_client::{CandidateFile, CompressorSession, HttpTransport, MemoryMaterializer};
//!
//! # async fn run(bytes: Vec<u8>) {
//! let transport = HttpTransport::with_base_url("http://localhost:3000");
//! let mut session = CompressorSession::new();
//!
//! session.select_file(CandidateFile::from_bytes("report.pdf", "application/pdf", bytes));
//! session.compress(&transport, &MemoryMaterializer).await;
//!
//! if let Some(outcome) = session.outcome() {
//!     println!("{} is {} bytes", outcome.name, outcome.compressed_size);
//! }
//! # }
//! ```

pub mod error;
pub mod session;
pub mod source;
pub mod status;
pub mod transport;
pub mod validator;

pub use error::{ClientError, ValidationError};
pub use session::{
    AttemptResult, CompressionOutcome, CompressorSession, PendingCompression, SelectionOutcome,
    SessionState,
};
pub use source::{FileSource, Materializer, MemoryDownload, MemoryMaterializer, Transport};
pub use status::{StatusKind, StatusMessage, COMPRESSION_FAILED};
pub use transport::{HttpTransport, COMPRESS_PATH};
pub use validator::{CandidateFile, StagedFile};
