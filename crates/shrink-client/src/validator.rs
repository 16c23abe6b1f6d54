//! Upload validation
//!
//! Decides whether a user-selected file may become the staged file.
//! Only the declared media type and byte length are inspected; the bytes
//! themselves are read later, when compression starts.

use std::fmt;
use std::rc::Rc;

use shrink_core::limits::{MAX_UPLOAD_BYTES, PDF_MIME_TYPE};

use crate::error::ValidationError;
use crate::source::FileSource;

/// A file the user picked, before validation
#[derive(Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub source: Rc<dyn FileSource>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size: u64,
        source: Rc<dyn FileSource>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            source,
        }
    }

    /// Candidate backed by bytes already in memory; size is their length
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let size = bytes.len() as u64;
        Self::new(name, media_type, size, Rc::new(bytes))
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// The validated file awaiting compression
#[derive(Clone)]
pub struct StagedFile {
    name: String,
    size: u64,
    source: Rc<dyn FileSource>,
}

impl StagedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }

    pub(crate) fn source(&self) -> &dyn FileSource {
        self.source.as_ref()
    }

    /// Same selection, not merely the same name and size
    pub(crate) fn is_same_file(&self, other: &StagedFile) -> bool {
        self.name == other.name
            && self.size == other.size
            && std::ptr::addr_eq(Rc::as_ptr(&self.source), Rc::as_ptr(&other.source))
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Check the type and size constraints. The type is checked first.
pub fn validate(candidate: &CandidateFile) -> Result<(), ValidationError> {
    if candidate.media_type != PDF_MIME_TYPE {
        return Err(ValidationError::InvalidType {
            media_type: candidate.media_type.clone(),
        });
    }

    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: candidate.size,
        });
    }

    Ok(())
}

/// Validate and convert into a [`StagedFile`]
pub fn stage(candidate: CandidateFile) -> Result<StagedFile, ValidationError> {
    validate(&candidate)?;
    Ok(StagedFile {
        name: candidate.name,
        size: candidate.size,
        source: candidate.source,
    })
}
