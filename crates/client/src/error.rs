//! Upload error types.

use std::fmt;
use std::path::PathBuf;

use crate::transport::TransportError;

/// Protocol step a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    UploadAll,
    Prepare,
    UploadPart(u32),
    Finish,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::UploadAll => f.write_str("upload_all"),
            Phase::Prepare => f.write_str("upload_prepare"),
            Phase::UploadPart(index) => write!(f, "upload_part #{index}"),
            Phase::Finish => f.write_str("upload_finish"),
        }
    }
}

/// Errors produced by a drive upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "file too large ({size} bytes, {:.2} GiB); drive uploads are limited to 2 GiB",
        as_gib(.size)
    )]
    SizeLimit { size: u64 },

    #[error("drive {phase} error {code}: {msg}")]
    Remote { phase: Phase, code: i64, msg: String },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid {phase} response: {reason}")]
    InvalidResponse { phase: Phase, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] larkdrive_transfer::TransferError),
}

impl UploadError {
    /// Returns the service's application status code for remote errors.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            UploadError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn as_gib(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}
