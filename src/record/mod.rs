//! Book records and their on-disk encoding.
//!
//! - [`Book`] - One catalog entry with a derived [`Status`]
//! - [`BookDraft`] / [`BookUpdate`] - Candidate values supplied by callers
//! - [`codec`] - Fixed-width slot encoding

mod book;
pub mod codec;

pub use book::{Book, BookDraft, BookUpdate, Price, Status};
