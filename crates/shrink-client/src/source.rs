//! Capabilities the session suspends on
//!
//! Reading the selected file, calling the transformation service and
//! turning the returned bytes into something downloadable are each an
//! `await` point (or a fallible call) behind a trait, so the session can
//! run headless against fakes and in the browser against web APIs.
//!
//! Futures are not `Send`: the client runs on one thread.

use async_trait::async_trait;

use shrink_core::{CompressRequest, CompressResponse};

use crate::error::ClientError;

/// Produces the raw bytes of a selected file
#[async_trait(?Send)]
pub trait FileSource {
    async fn read_bytes(&self) -> Result<Vec<u8>, ClientError>;
}

#[async_trait(?Send)]
impl FileSource for Vec<u8> {
    async fn read_bytes(&self) -> Result<Vec<u8>, ClientError> {
        Ok(self.clone())
    }
}

/// Sends one transformation request
#[async_trait(?Send)]
pub trait Transport {
    async fn compress(&self, request: &CompressRequest) -> Result<CompressResponse, ClientError>;
}

/// Turns decoded response bytes into a downloadable resource handle
pub trait Materializer {
    type Handle;

    fn materialize(&self, name: &str, bytes: Vec<u8>) -> Result<Self::Handle, ClientError>;
}

/// Downloadable document held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDownload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// [`Materializer`] for native callers and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryMaterializer;

impl Materializer for MemoryMaterializer {
    type Handle = MemoryDownload;

    fn materialize(&self, name: &str, bytes: Vec<u8>) -> Result<MemoryDownload, ClientError> {
        Ok(MemoryDownload {
            name: name.to_string(),
            bytes,
        })
    }
}
