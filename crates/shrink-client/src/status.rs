/// Shown for every failed attempt, whatever the cause
pub const COMPRESSION_FAILED: &str = "Error while compressing the PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Success,
}

/// The single notice currently visible to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn compression_succeeded(percentage: i64) -> Self {
        Self::success(format!(
            "Compression succeeded! Size reduced by {}%",
            percentage
        ))
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}
