use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TransferError;

/// Lifecycle of a multipart upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Prepare succeeded; no part sent yet.
    Prepared,
    /// At least one part accepted.
    PartsInFlight,
    /// Every byte accepted; ready for finish.
    PartsComplete,
    /// Finish succeeded.
    Done,
    /// Abandoned after an error.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Prepared => "prepared",
            SessionState::PartsInFlight => "uploading parts",
            SessionState::PartsComplete => "parts complete",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One accepted part, as listed in the finish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub part_index: u32,
}

/// State of a single multipart upload.
///
/// Owned by one upload call and dropped when it returns; never shared or
/// reused across files. Part indices are handed out strictly in order
/// starting at 0, and [`record_part`](Self::record_part) refuses anything
/// else, so the part list given to finish is always `0..n` without gaps.
#[derive(Debug)]
pub struct UploadSession {
    upload_id: String,
    block_size: u64,
    file_size: u64,
    offset: u64,
    next_index: u32,
    parts: Vec<PartDescriptor>,
    state: SessionState,
}

impl UploadSession {
    /// Creates a session from the server's prepare response.
    pub fn new(
        upload_id: impl Into<String>,
        block_size: u64,
        file_size: u64,
    ) -> Result<Self, TransferError> {
        if block_size == 0 {
            return Err(TransferError::InvalidBlockSize(block_size));
        }
        Ok(Self {
            upload_id: upload_id.into(),
            block_size,
            file_size,
            offset: 0,
            next_index: 0,
            parts: Vec::new(),
            state: SessionState::Prepared,
        })
    }

    /// Returns the `(part_index, offset)` of the next part to send, or
    /// `None` once the stat'd file size has been reached.
    pub fn next_part(&self) -> Option<(u32, u64)> {
        if !self.accepts_parts() || self.offset >= self.file_size {
            return None;
        }
        Some((self.next_index, self.offset))
    }

    /// Records a part the server accepted and advances the offset by the
    /// bytes actually read for it.
    pub fn record_part(&mut self, part_index: u32, bytes: u64) -> Result<(), TransferError> {
        if !self.accepts_parts() {
            return Err(TransferError::InvalidState {
                op: "record part",
                state: self.state,
            });
        }
        if part_index != self.next_index {
            return Err(TransferError::PartOutOfOrder {
                expected: self.next_index,
                got: part_index,
            });
        }
        if bytes == 0 {
            return Err(TransferError::EmptyPart(part_index));
        }

        self.parts.push(PartDescriptor { part_index });
        self.next_index += 1;
        self.offset += bytes;
        self.state = SessionState::PartsInFlight;
        Ok(())
    }

    /// Closes the part phase and returns the ordered part list.
    ///
    /// Fails with [`TransferError::SizeMismatch`] if the bytes read do not
    /// add up to the size stat'd at the start (the file shrank).
    pub fn finish_parts(&mut self) -> Result<&[PartDescriptor], TransferError> {
        if !self.accepts_parts() {
            return Err(TransferError::InvalidState {
                op: "finish parts",
                state: self.state,
            });
        }
        if self.offset != self.file_size {
            self.state = SessionState::Failed;
            return Err(TransferError::SizeMismatch {
                expected: self.file_size,
                actual: self.offset,
            });
        }
        self.state = SessionState::PartsComplete;
        Ok(&self.parts)
    }

    /// Marks the session as finished on the server.
    pub fn complete(&mut self) -> Result<(), TransferError> {
        if self.state != SessionState::PartsComplete {
            return Err(TransferError::InvalidState {
                op: "complete",
                state: self.state,
            });
        }
        self.state = SessionState::Done;
        Ok(())
    }

    /// Marks the session as abandoned.
    pub fn fail(&mut self) {
        self.state = SessionState::Failed;
    }

    fn accepts_parts(&self) -> bool {
        matches!(
            self.state,
            SessionState::Prepared | SessionState::PartsInFlight
        )
    }

    /// Server-issued upload id.
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Server-issued block size in bytes.
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Block size as a buffer length.
    pub fn block_len(&self) -> usize {
        usize::try_from(self.block_size).unwrap_or(usize::MAX)
    }

    /// Bytes accepted so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// File size stat'd at the start of the upload.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Parts accepted so far, in submission order.
    pub fn parts(&self) -> &[PartDescriptor] {
        &self.parts
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }
}
