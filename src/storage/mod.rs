//! Storage layer - slot files and the record store.
//!
//! This module handles persistent storage:
//! - [`RecordStore`] - The catalog API with atomic rewrites and backups
//! - [`RecordFile`] - Low-level slot I/O
//! - [`FileOps`] - Remove/rename/copy, swappable for fault injection

mod file_ops;
mod record_file;
mod sequence;
mod store;

pub use file_ops::{FileOps, OsFileOps};
pub use record_file::{RecordFile, Scan};
pub use sequence::IdSequence;
pub use store::{PageView, RecordStore};
