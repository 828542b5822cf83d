//! Configuration for catalogdb.
//!
//! Layout constants live here so the codec, the store and the validation
//! rules all agree on one set of widths and limits. [`StoreConfig`] carries
//! the file locations a store works with.

use std::path::{Path, PathBuf};

/// Size of one encoded record slot in bytes.
///
/// # Memory Layout
/// ```text
/// ┌──────┬────────────┬────────────┬───────┬──────┬────────┬──────┬───────┐
/// │ id   │ title      │ author     │ price │ qty  │ status │ rsvd │ crc32 │
/// │ 4    │ 50         │ 30         │ 4     │ 4    │ 1      │ 3    │ 4     │
/// └──────┴────────────┴────────────┴───────┴──────┴────────┴──────┴───────┘
/// ```
/// Slot N lives at file offset `N × SLOT_SIZE`.
pub const SLOT_SIZE: usize = 100;

/// Bytes reserved for the title, including the NUL terminator.
pub const TITLE_WIDTH: usize = 50;

/// Bytes reserved for the author, including the NUL terminator.
pub const AUTHOR_WIDTH: usize = 30;

/// Title length bounds (bytes).
pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = TITLE_WIDTH - 1;

/// Author length bounds (bytes).
pub const AUTHOR_MIN_LEN: usize = 2;
pub const AUTHOR_MAX_LEN: usize = AUTHOR_WIDTH - 1;

/// Price bounds in cents: [0.01, 9999.99].
pub const PRICE_MIN_CENTS: u32 = 1;
pub const PRICE_MAX_CENTS: u32 = 999_999;

/// Highest quantity a record may hold.
pub const QUANTITY_MAX: u32 = 999;

/// Records shown per page when listing.
pub const PAGE_SIZE: u64 = 5;

/// Default data file name used by [`StoreConfig::in_dir`].
pub const DEFAULT_DATA_FILE: &str = "books.dat";

/// File locations and durability settings for a [`RecordStore`].
///
/// The temp, backup and sequence files are siblings of the data file so that
/// renames between them never cross a filesystem boundary.
///
/// [`RecordStore`]: crate::storage::RecordStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// The live data file.
    pub data_path: PathBuf,
    /// Scratch file written during `replace_all`.
    pub temp_path: PathBuf,
    /// Full snapshot taken before destructive mutations.
    pub backup_path: PathBuf,
    /// Copy target for backup and recovery copies; renamed into place once
    /// complete.
    pub scratch_path: PathBuf,
    /// Persisted id high-water mark.
    pub sequence_path: PathBuf,
    /// Call `fsync` after every write. Only tests turn this off.
    pub sync_writes: bool,
}

impl StoreConfig {
    /// Derive every path from the data file path.
    ///
    /// `books.dat` yields `books.dat.tmp`, `books.dat.bak`, `books.dat.part`
    /// and `books.dat.seq`.
    pub fn new<P: AsRef<Path>>(data_path: P) -> Self {
        let data_path = data_path.as_ref().to_path_buf();
        Self {
            temp_path: with_suffix(&data_path, "tmp"),
            backup_path: with_suffix(&data_path, "bak"),
            scratch_path: with_suffix(&data_path, "part"),
            sequence_path: with_suffix(&data_path, "seq"),
            data_path,
            sync_writes: true,
        }
    }

    /// Use [`DEFAULT_DATA_FILE`] inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_DATA_FILE))
    }

    /// Toggle `fsync` after writes.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
