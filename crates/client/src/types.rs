//! Upload input/output types.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use larkdrive_transfer::{MAX_FILE_SIZE, SINGLE_SHOT_LIMIT};

use crate::error::UploadError;

/// Opaque token the drive returns for uploaded content.
///
/// Passed unmodified to whatever consumes it (e.g. as the `file_key` of a
/// file message).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local file as seen at the start of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub size: u64,
    /// Display name sent to the drive (final path component).
    pub name: String,
}

impl FileDescriptor {
    /// Stats `path` once and captures its size and display name.
    pub async fn stat(path: &Path) -> Result<Self, UploadError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(UploadError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(UploadError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            size: meta.len(),
            name,
        })
    }
}

/// Which upload protocol a file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadRoute {
    /// One `upload_all` request.
    SingleShot,
    /// `upload_prepare`, `upload_part` per block, `upload_finish`.
    Chunked,
}

impl UploadRoute {
    /// Selects the route for a file of `size` bytes.
    ///
    /// Sizes up to and including [`SINGLE_SHOT_LIMIT`] go single-shot.
    /// Anything above [`MAX_FILE_SIZE`] is refused.
    pub fn for_size(size: u64) -> Result<Self, UploadError> {
        if size > MAX_FILE_SIZE {
            return Err(UploadError::SizeLimit { size });
        }
        if size <= SINGLE_SHOT_LIMIT {
            Ok(UploadRoute::SingleShot)
        } else {
            Ok(UploadRoute::Chunked)
        }
    }
}

impl fmt::Display for UploadRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRoute::SingleShot => f.write_str("single-shot"),
            UploadRoute::Chunked => f.write_str("chunked"),
        }
    }
}

/// Progress events emitted during an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        file_name: String,
        size: u64,
        route: UploadRoute,
    },
    PartUploaded {
        part_index: u32,
        bytes_sent: u64,
        total_bytes: u64,
    },
    Completed {
        handle: ContentHandle,
    },
}

/// Per-call upload options.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Destination folder; overrides the configured default.
    pub parent_folder: Option<String>,
    /// Receives progress events. Events are sent without waiting: when the
    /// channel is full or closed the event is dropped and the upload goes on.
    pub events: Option<tokio::sync::mpsc::Sender<UploadEvent>>,
}

impl UploadOptions {
    pub fn with_parent_folder(mut self, folder: impl Into<String>) -> Self {
        self.parent_folder = Some(folder.into());
        self
    }

    pub fn with_events(mut self, tx: tokio::sync::mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub(crate) async fn emit(&self, event: UploadEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(?event, "event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
