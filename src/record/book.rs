//! The book record and the candidate types callers build.

use std::fmt;
use std::str::FromStr;

use crate::common::{BookId, ValidationError};

/// Availability of a book, derived from its quantity.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// At least one copy on the shelf.
    Available = 1,
    /// No copies left.
    Out = 2,
}

impl Status {
    /// The status a record with `quantity` copies must have.
    #[inline]
    pub fn for_quantity(quantity: u32) -> Self {
        if quantity > 0 {
            Status::Available
        } else {
            Status::Out
        }
    }

    /// Convert from u8, returning `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Status::Available),
            2 => Some(Status::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Out => "Out",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price held as whole cents so it round-trips exactly.
///
/// # Example
/// ```
/// use catalogdb::Price;
///
/// let price: Price = "19.99".parse().unwrap();
/// assert_eq!(price.cents(), 1999);
/// assert_eq!(price.to_string(), "19.99");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Price(u32);

impl Price {
    #[inline]
    pub const fn from_cents(cents: u32) -> Self {
        Price(cents)
    }

    #[inline]
    pub const fn cents(&self) -> u32 {
        self.0
    }
}

/// Parses `"12"`, `"12.5"`, `"12.50"` or `".5"`. More than two fraction
/// digits, signs and anything non-numeric are rejected.
impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if (whole.is_empty() && frac.is_empty())
            || frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ValidationError::Price);
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ValidationError::Price)?
        };
        let frac: u32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u32>().map_err(|_| ValidationError::Price)? * 10,
            _ => frac.parse().map_err(|_| ValidationError::Price)?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Price)
            .ok_or(ValidationError::Price)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One catalog entry.
///
/// Fields are private so that `status` can never disagree with `quantity`;
/// the only way to change the quantity is [`Book::set_quantity`], which
/// recomputes the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    price: Price,
    quantity: u32,
    status: Status,
}

impl Book {
    /// Build a record from a candidate and an assigned id.
    ///
    /// This does not validate; the store runs the validation rules before
    /// anything reaches disk.
    pub fn from_draft(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            price: draft.price,
            quantity: draft.quantity,
            status: Status::for_quantity(draft.quantity),
        }
    }

    pub(crate) fn from_parts(
        id: BookId,
        title: String,
        author: String,
        price: Price,
        quantity: u32,
    ) -> Self {
        Self::from_draft(
            id,
            BookDraft {
                title,
                author,
                price,
                quantity,
            },
        )
    }

    #[inline]
    pub fn id(&self) -> BookId {
        self.id
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn set_author(&mut self, author: String) {
        self.author = author;
    }

    pub fn set_price(&mut self, price: Price) {
        self.price = price;
    }

    /// Change the quantity and recompute the status.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.status = Status::for_quantity(quantity);
    }

    /// Apply every supplied field of `update`, keeping the rest.
    pub fn apply(&mut self, update: BookUpdate) {
        if let Some(title) = update.title {
            self.set_title(title);
        }
        if let Some(author) = update.author {
            self.set_author(author);
        }
        if let Some(price) = update.price {
            self.set_price(price);
        }
        if let Some(quantity) = update.quantity {
            self.set_quantity(quantity);
        }
    }

    /// The candidate fields of this record, without id or status.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Candidate fields for a new record. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub price: Price,
    pub quantity: u32,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            price,
            quantity,
        }
    }
}

/// Replacement values for an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<Price>,
    pub quantity: Option<u32>,
}

impl BookUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book::from_draft(
            BookId::new(1),
            BookDraft::new("Go Basics", "Jane Doe", Price::from_cents(1999), 3),
        )
    }

    #[test]
    fn test_status_derived_from_quantity() {
        assert_eq!(Status::for_quantity(0), Status::Out);
        assert_eq!(Status::for_quantity(1), Status::Available);
        assert_eq!(Status::for_quantity(999), Status::Available);
    }

    #[test]
    fn test_status_from_u8() {
        assert_eq!(Status::from_u8(1), Some(Status::Available));
        assert_eq!(Status::from_u8(2), Some(Status::Out));
        assert_eq!(Status::from_u8(0), None);
        assert_eq!(Status::from_u8(255), None);
    }

    #[test]
    fn test_price_parse() {
        assert_eq!("19.99".parse::<Price>(), Ok(Price::from_cents(1999)));
        assert_eq!("19.9".parse::<Price>(), Ok(Price::from_cents(1990)));
        assert_eq!("19".parse::<Price>(), Ok(Price::from_cents(1900)));
        assert_eq!(".5".parse::<Price>(), Ok(Price::from_cents(50)));
        assert_eq!(" 0.01 ".parse::<Price>(), Ok(Price::from_cents(1)));
    }

    #[test]
    fn test_price_parse_rejects_garbage() {
        for bad in ["", ".", "abc", "1.234", "-1", "+1", "1,50", "99999999999"] {
            assert_eq!(bad.parse::<Price>(), Err(ValidationError::Price), "{bad:?}");
        }
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(1999).to_string(), "19.99");
        assert_eq!(Price::from_cents(5).to_string(), "0.05");
        assert_eq!(Price::from_cents(999_999).to_string(), "9999.99");
    }

    #[test]
    fn test_from_draft_sets_status() {
        let book = sample();
        assert_eq!(book.status(), Status::Available);

        let out = Book::from_draft(
            BookId::new(2),
            BookDraft::new("Rust", "Ann", Price::from_cents(100), 0),
        );
        assert_eq!(out.status(), Status::Out);
    }

    #[test]
    fn test_set_quantity_recomputes_status() {
        let mut book = sample();
        book.set_quantity(0);
        assert_eq!(book.status(), Status::Out);
        book.set_quantity(4);
        assert_eq!(book.status(), Status::Available);
    }

    #[test]
    fn test_apply_keeps_unsupplied_fields() {
        let mut book = sample();
        book.apply(BookUpdate::default().quantity(0));

        assert_eq!(book.title(), "Go Basics");
        assert_eq!(book.author(), "Jane Doe");
        assert_eq!(book.price(), Price::from_cents(1999));
        assert_eq!(book.quantity(), 0);
        assert_eq!(book.status(), Status::Out);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(BookUpdate::default().is_empty());
        assert!(!BookUpdate::default().title("New").is_empty());
    }
}
