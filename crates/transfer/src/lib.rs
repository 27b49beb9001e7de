//! Block-oriented file reading and multipart session bookkeeping.
//!
//! This crate holds everything about a drive upload that does not touch
//! the network: the size limits that decide which upload path runs, the
//! positional block reader used by the chunked path, and the session
//! state machine that keeps part indices contiguous.

mod chunked;
mod session;

pub use chunked::{Chunk, ChunkReader, part_count};
pub use session::{PartDescriptor, SessionState, UploadSession};

/// Largest file sent through the single-request upload (inclusive): 20 MiB.
///
/// This is the remote service's documented boundary, not a tuning knob.
pub const SINGLE_SHOT_LIMIT: u64 = 20 * 1024 * 1024;

/// Absolute ceiling for any drive upload: 2 GiB.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid block size: {0}")]
    InvalidBlockSize(u64),

    #[error("part out of order: expected index {expected}, got {got}")]
    PartOutOfOrder { expected: u32, got: u32 },

    #[error("part {0} carried no data")]
    EmptyPart(u32),

    #[error("file size changed during upload: expected {expected} bytes, read {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("cannot {op} while session is {state}")]
    InvalidState {
        op: &'static str,
        state: SessionState,
    },
}
