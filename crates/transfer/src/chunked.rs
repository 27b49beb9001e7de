use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::TransferError;

/// Returns how many parts a file of `file_size` bytes splits into with
/// blocks of `block_size` bytes (`ceil(file_size / block_size)`).
///
/// A zero block size yields zero parts.
pub fn part_count(file_size: u64, block_size: u64) -> u64 {
    if block_size == 0 {
        return 0;
    }
    file_size.div_ceil(block_size)
}

/// A contiguous byte range of the source file, submitted as one part.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based part index within the session.
    pub part_index: u32,
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file in blocks at arbitrary offsets without loading it whole.
///
/// The file handle is owned by the reader and closed when it is dropped,
/// so every exit path of an upload releases the descriptor.
#[derive(Debug)]
pub struct ChunkReader {
    file: File,
    path: PathBuf,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for block reading, taking its size from the open handle.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        tracing::debug!(path = %path.display(), size = file_size, "opened file for block reads");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            file_size,
        })
    }

    /// Reads up to `max_len` bytes starting at `offset`.
    ///
    /// Short reads from the OS are retried until either `max_len` bytes are
    /// collected or end-of-file is hit, so only the final block of a file
    /// comes back shorter than requested. Returns an empty buffer at EOF.
    pub fn read_block(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>, TransferError> {
        self.file.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; max_len];
        let mut filled = 0;
        while filled < max_len {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    /// Reads the chunk for `part_index` at `offset`, bounded by `block_size`.
    ///
    /// Returns `None` when nothing is left to read at `offset`.
    pub fn read_chunk(
        &mut self,
        part_index: u32,
        offset: u64,
        block_size: usize,
    ) -> Result<Option<Chunk>, TransferError> {
        if block_size == 0 {
            return Err(TransferError::InvalidBlockSize(0));
        }
        let data = self.read_block(offset, block_size)?;
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(Chunk {
            part_index,
            offset,
            data,
        }))
    }

    /// Size of the file when it was opened.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path the reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
