//! Persisted id high-water mark.
//!
//! Deleting the last record would otherwise let the next `add` reuse its id,
//! because the tail slot is the only place ids are read from. The sidecar
//! remembers the highest id ever handed out.
//!
//! # Layout (8 bytes)
//! ```text
//! Offset  Size  Field
//! 0       4     high water id (u32, little-endian)
//! 4       4     CRC32 of bytes 0..4
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::common::{BookId, Result};

const SEQUENCE_LEN: usize = 8;

/// Reads and writes the sequence sidecar.
#[derive(Debug, Clone)]
pub struct IdSequence {
    path: PathBuf,
    sync_writes: bool,
}

impl IdSequence {
    pub fn new<P: AsRef<Path>>(path: P, sync_writes: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sync_writes,
        }
    }

    /// The stored high water mark.
    ///
    /// Returns `None` when the file is missing or damaged; the store then
    /// falls back to scanning the data file.
    pub fn load(&self) -> Option<BookId> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };
        if bytes.len() != SEQUENCE_LEN {
            warn!(path = %self.path.display(), len = bytes.len(), "ignoring malformed id sequence");
            return None;
        }

        let id = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let crc = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if crc32fast::hash(&id) != crc {
            warn!(path = %self.path.display(), "ignoring id sequence with bad checksum");
            return None;
        }
        Some(BookId::new(u32::from_le_bytes(id)))
    }

    /// Persist `high_water` by writing a scratch file and renaming it over.
    pub fn store(&self, high_water: BookId) -> Result<()> {
        let id = high_water.0.to_le_bytes();
        let mut bytes = [0u8; SEQUENCE_LEN];
        bytes[..4].copy_from_slice(&id);
        bytes[4..].copy_from_slice(&crc32fast::hash(&id).to_le_bytes());

        let scratch = self.scratch_path();
        {
            let mut file = File::create(&scratch)?;
            file.write_all(&bytes)?;
            if self.sync_writes {
                file.sync_all()?;
            }
        }
        fs::rename(&scratch, &self.path)?;
        Ok(())
    }

    fn scratch_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
