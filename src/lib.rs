//! catalogdb - a single-user book catalog stored as fixed-size binary slots.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           catalogdb                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Terminal menu (bin: catalogdb)                │   │
//! │  │       add · search · update · delete · display           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │               ↓                              ↓                  │
//! │  ┌───────────────────────────┐  ┌───────────────────────────┐  │
//! │  │  Validation (validation)  │  │  Pagination (pagination)  │  │
//! │  │  pure field predicates    │  │  PageCursor, 5 per page   │  │
//! │  └───────────────────────────┘  └───────────────────────────┘  │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Record Store (storage/)                      │   │
//! │  │  RecordStore: scan · append · replace_all · backup       │   │
//! │  │  RecordFile: slot I/O    FileOps: remove/rename/copy     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Record Codec (record/)                       │   │
//! │  │        Book ⇄ 100-byte slot, CRC32 per slot              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BookId, Error, config)
//! - [`record`] - The Book record and its slot codec
//! - [`storage`] - Slot files and the record store
//! - [`validation`] - Field rules
//! - [`pagination`] - Page arithmetic and the paging cursor
//! - [`logging`] - Tracing subscriber setup
//!
//! # Quick Start
//! ```no_run
//! use catalogdb::{BookDraft, Price, RecordStore, StoreConfig};
//!
//! let mut store = RecordStore::open(StoreConfig::new("books.dat")).unwrap();
//!
//! let id = store
//!     .add(BookDraft::new("Go Basics", "Jane Doe", Price::from_cents(1999), 3))
//!     .unwrap();
//! let book = store.search(id).unwrap();
//! assert_eq!(book.status().as_str(), "Available");
//! ```

pub mod common;
pub mod logging;
pub mod pagination;
pub mod record;
pub mod storage;
pub mod validation;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PAGE_SIZE, SLOT_SIZE};
pub use common::{BookId, Error, Result, StoreConfig, ValidationError};

pub use pagination::{CursorState, Direction, PageCommand, PageCursor};
pub use record::{Book, BookDraft, BookUpdate, Price, Status};
pub use storage::{FileOps, OsFileOps, PageView, RecordFile, RecordStore};
