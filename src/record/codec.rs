//! Record codec - the fixed-width on-disk form of a [`Book`].
//!
//! Every slot in the data, temp and backup files is produced by [`encode`]
//! and read back by [`decode`]. The layout is explicit so the file format
//! does not depend on compiler struct layout or platform padding.

use crate::common::config::{AUTHOR_WIDTH, SLOT_SIZE, TITLE_WIDTH};
use crate::common::{BookId, Error, Result};
use crate::record::{Book, Price, Status};

/// One encoded record.
pub type Slot = [u8; SLOT_SIZE];

/// Offset of each field within a slot.
///
/// # Layout (100 bytes, little-endian)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     id
/// 4       50    title (UTF-8, NUL padded, NUL terminated)
/// 54      30    author (UTF-8, NUL padded, NUL terminated)
/// 84      4     price in cents
/// 88      4     quantity
/// 92      1     status (Status as u8)
/// 93      3     reserved, zero
/// 96      4     checksum (CRC32 over bytes 0..96)
/// ```
pub const OFFSET_ID: usize = 0;
pub const OFFSET_TITLE: usize = 4;
pub const OFFSET_AUTHOR: usize = OFFSET_TITLE + TITLE_WIDTH;
pub const OFFSET_PRICE: usize = OFFSET_AUTHOR + AUTHOR_WIDTH;
pub const OFFSET_QUANTITY: usize = OFFSET_PRICE + 4;
pub const OFFSET_STATUS: usize = OFFSET_QUANTITY + 4;
pub const OFFSET_CHECKSUM: usize = SLOT_SIZE - 4;

/// Encode a record into a fresh slot.
///
/// Text longer than its field is cut at the last UTF-8 character boundary
/// that still leaves room for the NUL terminator.
pub fn encode(book: &Book) -> Slot {
    let mut slot = [0u8; SLOT_SIZE];

    write_u32(&mut slot, OFFSET_ID, book.id().0);
    write_text(&mut slot[OFFSET_TITLE..OFFSET_TITLE + TITLE_WIDTH], book.title());
    write_text(
        &mut slot[OFFSET_AUTHOR..OFFSET_AUTHOR + AUTHOR_WIDTH],
        book.author(),
    );
    write_u32(&mut slot, OFFSET_PRICE, book.price().cents());
    write_u32(&mut slot, OFFSET_QUANTITY, book.quantity());
    slot[OFFSET_STATUS] = book.status() as u8;

    let checksum = compute_checksum(&slot);
    write_u32(&mut slot, OFFSET_CHECKSUM, checksum);

    slot
}

/// Decode a slot read from disk.
///
/// `index` is the slot's position in the file and is only used for error
/// reporting.
///
/// # Errors
/// `Error::CorruptSlot` if the checksum, text encoding or status byte is bad.
pub fn decode(slot: &[u8], index: u64) -> Result<Book> {
    let corrupt = |reason| Error::CorruptSlot { index, reason };

    if slot.len() != SLOT_SIZE {
        return Err(corrupt("wrong slot size"));
    }
    if read_u32(slot, OFFSET_CHECKSUM) != compute_checksum(slot) {
        return Err(corrupt("checksum mismatch"));
    }

    let id = BookId::new(read_u32(slot, OFFSET_ID));
    let title = read_text(&slot[OFFSET_TITLE..OFFSET_TITLE + TITLE_WIDTH])
        .ok_or_else(|| corrupt("title is not valid UTF-8"))?;
    let author = read_text(&slot[OFFSET_AUTHOR..OFFSET_AUTHOR + AUTHOR_WIDTH])
        .ok_or_else(|| corrupt("author is not valid UTF-8"))?;
    let price = Price::from_cents(read_u32(slot, OFFSET_PRICE));
    let quantity = read_u32(slot, OFFSET_QUANTITY);

    match Status::from_u8(slot[OFFSET_STATUS]) {
        Some(status) if status == Status::for_quantity(quantity) => {}
        Some(_) => return Err(corrupt("status disagrees with quantity")),
        None => return Err(corrupt("unknown status")),
    }

    Ok(Book::from_parts(id, title, author, price, quantity))
}

/// Read only the id of a slot, skipping full decode.
///
/// Used for the tail read in `next_id`; the checksum is still verified.
pub fn decode_id(slot: &[u8], index: u64) -> Result<BookId> {
    if slot.len() != SLOT_SIZE || read_u32(slot, OFFSET_CHECKSUM) != compute_checksum(slot) {
        return Err(Error::CorruptSlot {
            index,
            reason: "checksum mismatch",
        });
    }
    Ok(BookId::new(read_u32(slot, OFFSET_ID)))
}

/// CRC32 over everything that precedes the checksum field.
pub fn compute_checksum(slot: &[u8]) -> u32 {
    crc32fast::hash(&slot[..OFFSET_CHECKSUM])
}

#[inline]
fn write_u32(slot: &mut [u8], offset: usize, value: u32) {
    slot[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn read_u32(slot: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        slot[offset],
        slot[offset + 1],
        slot[offset + 2],
        slot[offset + 3],
    ])
}

fn write_text(field: &mut [u8], text: &str) {
    let max = field.len() - 1;
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    field[..end].copy_from_slice(&text.as_bytes()[..end]);
    field[end..].fill(0);
}

fn read_text(field: &[u8]) -> Option<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).ok().map(str::to_owned)
}
