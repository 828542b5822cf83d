//! Common types and utilities shared across catalogdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`StoreConfig`]
//! - Error types
//! - The [`BookId`] identifier

mod book_id;
pub mod config;
pub mod error;

pub use book_id::BookId;
pub use config::StoreConfig;
pub use error::{Error, Result, ValidationError};
