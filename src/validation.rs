//! Field validation rules.
//!
//! Pure predicates over candidate values. None of them touch the file; the
//! store supplies the set of existing ids when uniqueness matters.

use std::collections::HashSet;

use crate::common::config::{
    AUTHOR_MAX_LEN, AUTHOR_MIN_LEN, PRICE_MAX_CENTS, PRICE_MIN_CENTS, QUANTITY_MAX,
    TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use crate::common::{BookId, ValidationError};
use crate::record::{BookDraft, BookUpdate, Price};

/// Title length in [3, 49] bytes with no control characters.
///
/// Length is counted in UTF-8 bytes, not characters: the title field is 50
/// bytes with a NUL terminator, so a title of 25 two-byte characters is
/// rejected rather than truncated on disk.
pub fn valid_title(title: &str) -> bool {
    (TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&title.len())
        && !title.chars().any(char::is_control)
}

/// Author length in [2, 29] and only ASCII letters and spaces.
pub fn valid_author(author: &str) -> bool {
    (AUTHOR_MIN_LEN..=AUTHOR_MAX_LEN).contains(&author.len())
        && author.chars().all(|c| c.is_ascii_alphabetic() || c == ' ')
}

/// Price in [0.01, 9999.99].
pub fn valid_price(price: Price) -> bool {
    (PRICE_MIN_CENTS..=PRICE_MAX_CENTS).contains(&price.cents())
}

/// Quantity in [0, 999].
pub fn valid_quantity(quantity: u32) -> bool {
    quantity <= QUANTITY_MAX
}

/// Positive and not already taken.
pub fn valid_id(id: BookId, existing: &HashSet<BookId>) -> bool {
    id.is_valid() && !existing.contains(&id)
}

/// Check every field of a new record, reporting the first that fails.
pub fn validate_draft(draft: &BookDraft) -> Result<(), ValidationError> {
    if !valid_title(&draft.title) {
        return Err(ValidationError::Title);
    }
    if !valid_author(&draft.author) {
        return Err(ValidationError::Author);
    }
    if !valid_price(draft.price) {
        return Err(ValidationError::Price);
    }
    if !valid_quantity(draft.quantity) {
        return Err(ValidationError::Quantity);
    }
    Ok(())
}

/// Check only the fields an update supplies.
pub fn validate_update(update: &BookUpdate) -> Result<(), ValidationError> {
    if update.title.as_deref().is_some_and(|t| !valid_title(t)) {
        return Err(ValidationError::Title);
    }
    if update.author.as_deref().is_some_and(|a| !valid_author(a)) {
        return Err(ValidationError::Author);
    }
    if update.price.is_some_and(|p| !valid_price(p)) {
        return Err(ValidationError::Price);
    }
    if update.quantity.is_some_and(|q| !valid_quantity(q)) {
        return Err(ValidationError::Quantity);
    }
    Ok(())
}
