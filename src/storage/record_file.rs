//! Record File - low-level I/O for fixed-size record slots.
//!
//! The [`RecordFile`] handles all direct file operations on one slot file:
//! - Reading a slot by index or scanning all slots in order
//! - Appending slots at the end
//! - Writing a whole sequence (used for the temp file)

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::warn;

use crate::common::config::SLOT_SIZE;
use crate::common::{BookId, Result};
use crate::record::codec::{self, Slot};
use crate::record::Book;

/// Manages I/O for a single slot file.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Slot 0  │ Slot 1  │ Slot 2  │  ...    │ Slot N  │
/// │ (100B)  │ (100B)  │ (100B)  │         │ (100B)  │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      100      200     ...    N×100
/// ```
///
/// There is no header and no free list. A trailing fragment shorter than a
/// slot (left by a torn append) is ignored and overwritten by the next append.
///
/// # Durability
/// With `sync_writes` on, every append is followed by `fsync()`.
pub struct RecordFile {
    file: File,
    /// Number of whole slots in the file.
    slot_count: u64,
    sync_writes: bool,
}

impl RecordFile {
    /// Create (or truncate) a slot file.
    pub fn create<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            slot_count: 0,
            sync_writes,
        })
    }

    /// Open an existing slot file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let file_size = file.metadata()?.len();
        let slot_count = file_size / SLOT_SIZE as u64;
        if file_size % SLOT_SIZE as u64 != 0 {
            warn!(
                path = %path.display(),
                file_size,
                "ignoring partial slot at end of file"
            );
        }

        Ok(Self {
            file,
            slot_count,
            sync_writes,
        })
    }

    /// Open an existing slot file, or create an empty one.
    pub fn open_or_create<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, sync_writes)
        } else {
            Self::create(path, sync_writes)
        }
    }

    /// Read and decode the slot at `index`.
    pub fn read_slot(&mut self, index: u64) -> Result<Book> {
        let slot = self.read_raw(index)?;
        codec::decode(&slot, index)
    }

    /// Id of the last physical slot, or `None` for an empty file.
    pub fn read_last_id(&mut self) -> Result<Option<BookId>> {
        if self.slot_count == 0 {
            return Ok(None);
        }
        let index = self.slot_count - 1;
        let slot = self.read_raw(index)?;
        codec::decode_id(&slot, index).map(Some)
    }

    /// Append one record, returning its slot index.
    ///
    /// # Durability
    /// The slot is flushed to stable storage before this returns.
    pub fn append(&mut self, book: &Book) -> Result<u64> {
        let index = self.slot_count;
        self.file.seek(SeekFrom::Start(index * SLOT_SIZE as u64))?;
        self.file.write_all(&codec::encode(book))?;
        if self.sync_writes {
            self.file.sync_all()?;
        }

        self.slot_count += 1;
        Ok(index)
    }

    /// Write `books` in order after the current end, then sync once.
    pub fn append_all(&mut self, books: &[Book]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(self.slot_count * SLOT_SIZE as u64))?;
        {
            let mut writer = BufWriter::new(&mut self.file);
            for book in books {
                writer.write_all(&codec::encode(book))?;
            }
            writer.flush()?;
        }
        if self.sync_writes {
            self.file.sync_all()?;
        }

        self.slot_count += books.len() as u64;
        Ok(())
    }

    /// Iterate all slots from the start, in physical order.
    pub fn scan(&mut self) -> Result<Scan<'_>> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(Scan {
            reader: BufReader::new(&mut self.file),
            index: 0,
            slot_count: self.slot_count,
            done: false,
        })
    }

    /// Flush file contents to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Get the number of whole slots in the file.
    #[inline]
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    /// Get the size of the slot area in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        self.slot_count * SLOT_SIZE as u64
    }

    fn read_raw(&mut self, index: u64) -> Result<Slot> {
        if index >= self.slot_count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("slot {} past end of file ({} slots)", index, self.slot_count),
            )
            .into());
        }

        self.file.seek(SeekFrom::Start(index * SLOT_SIZE as u64))?;
        let mut slot = [0u8; SLOT_SIZE];
        self.file.read_exact(&mut slot)?;
        Ok(slot)
    }
}

/// Lazy, finite iterator over the slots of a [`RecordFile`].
///
/// The first read or decode failure is yielded once; after that the
/// iterator is exhausted.
pub struct Scan<'a> {
    reader: BufReader<&'a mut File>,
    index: u64,
    slot_count: u64,
    done: bool,
}

impl Iterator for Scan<'_> {
    type Item = Result<Book>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.slot_count {
            return None;
        }

        let index = self.index;
        self.index += 1;

        let mut slot = [0u8; SLOT_SIZE];
        let result = self
            .reader
            .read_exact(&mut slot)
            .map_err(Into::into)
            .and_then(|_| codec::decode(&slot, index));

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = (self.slot_count - self.index) as usize;
        (0, Some(remaining))
    }
}

impl std::iter::FusedIterator for Scan<'_> {}
