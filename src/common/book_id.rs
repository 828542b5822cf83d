//! Book identifier type.

use std::fmt;

/// Identifies a book record.
///
/// Ids are positive and handed out by the store in increasing order; `0` is
/// never assigned and is reserved as the sentinel.
///
/// # Example
/// ```
/// use catalogdb::BookId;
///
/// let id = BookId::new(7);
/// assert!(id.is_valid());
/// assert_eq!(id.to_string(), "0007");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub u32);

impl BookId {
    /// Invalid/sentinel id.
    pub const INVALID: BookId = BookId(0);

    /// The id assigned to the first record of an empty store.
    pub const FIRST: BookId = BookId(1);

    /// Create a new BookId.
    #[inline]
    pub fn new(id: u32) -> Self {
        BookId(id)
    }

    /// Check if this id is valid (positive).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }

    /// The id following this one.
    #[inline]
    pub fn next(&self) -> BookId {
        BookId(self.0.saturating_add(1))
    }
}

/// Zero-padded to four digits, the way ids are shown to users.
impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
