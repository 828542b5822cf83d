//! Error types for catalogdb.

use thiserror::Error as ThisError;

use crate::common::BookId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in catalogdb.
///
/// Three kinds are recoverable and leave the store untouched:
/// [`Error::Validation`], [`Error::NotFound`] and [`Error::EmptyStore`].
/// [`Error::Io`] and [`Error::CorruptSlot`] abort the current operation.
/// [`Error::RecoveryFailed`] and [`Error::Poisoned`] are fatal; see
/// [`Error::is_fatal`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A candidate field is outside its contract.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No live record carries this id.
    #[error("Book {0} not found")]
    NotFound(BookId),

    /// Listing was requested on a store with no records.
    #[error("No books found in the catalog")]
    EmptyStore,

    /// A slot on disk could not be decoded.
    #[error("Corrupt slot {index}: {reason}")]
    CorruptSlot { index: u64, reason: &'static str },

    /// A destructive step failed and putting the live file back failed too.
    ///
    /// The data file may be missing or stale; the caller must stop.
    #[error("Recovery failed after {source}; recovery error: {recovery}")]
    RecoveryFailed {
        source: std::io::Error,
        recovery: std::io::Error,
    },

    /// An earlier recovery failed; the store refuses further work.
    #[error("Store is unusable after a failed recovery")]
    Poisoned,
}

impl Error {
    /// True when the session must end because the store is in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::RecoveryFailed { .. } | Error::Poisoned)
    }

    /// True for errors a caller handles by re-prompting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound(_) | Error::EmptyStore
        )
    }
}

/// A single field that failed validation.
///
/// The messages double as user prompts in the terminal menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("Invalid title! Must be 3-49 characters")]
    Title,

    #[error("Invalid author name! Use 2-29 letters and spaces only")]
    Author,

    #[error("Invalid price! Enter between 0.01 and 9999.99")]
    Price,

    #[error("Invalid quantity! Enter between 0 and 999")]
    Quantity,

    #[error("Invalid ID! Must be positive and unused")]
    Id,
}
