//! Pagination over the physical record order.
//!
//! A [`PageCursor`] knows the total record count and the current page.
//! Moving past either end is a no-op, never an error and never a wrap.

use std::ops::Range;

use crate::common::config::PAGE_SIZE;

/// Navigation commands from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// A command read from the paging prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Next,
    Previous,
    Quit,
}

impl PageCommand {
    /// Parse `N`, `P` or `Q`, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "N" => Some(PageCommand::Next),
            "P" => Some(PageCommand::Previous),
            "Q" => Some(PageCommand::Quit),
            _ => None,
        }
    }
}

/// Cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No records; there is no page 1.
    Empty,
    /// Showing a 1-based page.
    Viewing(u64),
}

/// Number of pages needed for `total_records`; zero when empty.
pub fn total_pages(total_records: u64) -> u64 {
    total_records.div_ceil(PAGE_SIZE)
}

/// Index of the first record on `page` (1-based).
///
/// Only meaningful for `1 <= page <= total_pages`.
pub fn start_index(page: u64) -> u64 {
    page.saturating_sub(1) * PAGE_SIZE
}

/// Move one page in `direction`, clamped to `[1, total_pages]`.
pub fn advance(page: u64, direction: Direction, total_pages: u64) -> u64 {
    match direction {
        Direction::Next if page < total_pages => page + 1,
        Direction::Previous if page > 1 => page - 1,
        _ => page,
    }
}

/// A paging session over a fixed record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    total_records: u64,
    state: CursorState,
}

impl PageCursor {
    /// Start on page 1, or in the empty state if there are no records.
    pub fn new(total_records: u64) -> Self {
        let state = if total_records == 0 {
            CursorState::Empty
        } else {
            CursorState::Viewing(1)
        };
        Self {
            total_records,
            state,
        }
    }

    #[inline]
    pub fn state(&self) -> CursorState {
        self.state
    }

    #[inline]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    #[inline]
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_records)
    }

    /// Current page, or `None` when empty.
    pub fn page(&self) -> Option<u64> {
        match self.state {
            CursorState::Empty => None,
            CursorState::Viewing(page) => Some(page),
        }
    }

    /// Record indices covered by the current page.
    pub fn range(&self) -> Option<Range<u64>> {
        self.page().map(|page| page_range(page, self.total_records))
    }

    /// Move in `direction`. Has no effect when empty.
    pub fn advance(&mut self, direction: Direction) {
        if let CursorState::Viewing(page) = self.state {
            self.state = CursorState::Viewing(advance(page, direction, self.total_pages()));
        }
    }

    /// Apply a command. Returns `false` once the session has ended.
    pub fn handle(&mut self, command: PageCommand) -> bool {
        match command {
            PageCommand::Next => self.advance(Direction::Next),
            PageCommand::Previous => self.advance(Direction::Previous),
            PageCommand::Quit => return false,
        }
        true
    }
}

/// Half-open index range of `page`, cut short on the last page.
pub fn page_range(page: u64, total_records: u64) -> Range<u64> {
    let start = start_index(page).min(total_records);
    let end = (start + PAGE_SIZE).min(total_records);
    start..end
}
