//! Interactive menu over a [`RecordStore`].
//!
//! Reads commands line by line and writes prompts and tables. Generic over
//! the reader and writer so the whole flow can be driven from a test.

use std::io::{BufRead, Write};

use catalogdb::pagination::PageCommand;
use catalogdb::validation::{valid_author, valid_price, valid_quantity, valid_title};
use catalogdb::{
    Book, BookDraft, BookId, BookUpdate, Error, FileOps, PageCursor, Price, RecordStore, Result,
    ValidationError,
};

pub struct Menu<'s, F: FileOps, R, W> {
    store: &'s mut RecordStore<F>,
    input: R,
    output: W,
}

impl<'s, F: FileOps, R: BufRead, W: Write> Menu<'s, F, R, W> {
    pub fn new(store: &'s mut RecordStore<F>, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends.
    ///
    /// Only fatal store errors are returned; everything else is reported
    /// and the menu continues.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.header("LIBRARY MANAGEMENT SYSTEM")?;
            writeln!(self.output, "1. Add New Book")?;
            writeln!(self.output, "2. Search Book")?;
            writeln!(self.output, "3. Update Book")?;
            writeln!(self.output, "4. Delete Book")?;
            writeln!(self.output, "5. Display All Books")?;
            writeln!(self.output, "6. Exit")?;

            let Some(choice) = self.prompt("\nEnter your choice (1-6): ")? else {
                return Ok(());
            };

            let outcome = match choice.as_str() {
                "1" => self.add_books(),
                "2" => self.search_book(),
                "3" => self.update_book(),
                "4" => self.delete_book(),
                "5" => self.display_books(),
                "6" => {
                    writeln!(self.output, "\nThank you for using Library Management System!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "\nInvalid choice! Please try again.")?;
                    Ok(())
                }
            };

            match outcome {
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => writeln!(self.output, "\nError: {}", e)?,
                Ok(()) => {}
            }
        }
    }

    fn add_books(&mut self) -> Result<()> {
        loop {
            self.header("ADD NEW BOOK")?;

            let Some(title) =
                self.ask("Enter Book Title: ", ValidationError::Title, owned_if(valid_title))?
            else {
                return Ok(());
            };
            let Some(author) =
                self.ask("Enter Author Name: ", ValidationError::Author, owned_if(valid_author))?
            else {
                return Ok(());
            };
            let Some(price) = self.ask("Enter Price: ", ValidationError::Price, parse_price)? else {
                return Ok(());
            };
            let Some(quantity) =
                self.ask("Enter Quantity: ", ValidationError::Quantity, parse_quantity)?
            else {
                return Ok(());
            };

            let id = self
                .store
                .add(BookDraft::new(title, author, price, quantity))?;
            writeln!(self.output, "\nBook added successfully! ID: {}", id)?;

            if !self.confirm("\nDo you want to add another book? (Y/N): ")? {
                return Ok(());
            }
        }
    }

    fn search_book(&mut self) -> Result<()> {
        self.header("SEARCH BOOK")?;
        let Some(id) = self.ask_id("Enter Book ID to search: ")? else {
            return Ok(());
        };

        match self.store.search(id) {
            Ok(book) => self.show_details("Book Details", &book),
            Err(Error::NotFound(_)) => {
                writeln!(self.output, "\nBook not found!")?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn update_book(&mut self) -> Result<()> {
        self.header("UPDATE BOOK")?;
        let Some(id) = self.ask_id("Enter Book ID to update: ")? else {
            return Ok(());
        };

        let current = match self.store.search(id) {
            Ok(book) => book,
            Err(Error::NotFound(_)) => {
                writeln!(self.output, "\nBook not found!")?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.show_details("Current Book Details", &current)?;

        let title = self.ask_optional("new Title", ValidationError::Title, owned_if(valid_title))?;
        let Some(title) = title else { return Ok(()) };
        let author =
            self.ask_optional("new Author", ValidationError::Author, owned_if(valid_author))?;
        let Some(author) = author else { return Ok(()) };
        let price = self.ask_optional("new Price", ValidationError::Price, parse_price)?;
        let Some(price) = price else { return Ok(()) };
        let quantity =
            self.ask_optional("new Quantity", ValidationError::Quantity, parse_quantity)?;
        let Some(quantity) = quantity else { return Ok(()) };

        let update = BookUpdate {
            title,
            author,
            price,
            quantity,
        };

        if update.is_empty() {
            writeln!(self.output, "\nNothing changed.")?;
            return Ok(());
        }

        let revised = self.store.update(id, update)?;
        writeln!(self.output, "\nBook updated successfully! Status: {}", revised.status())?;
        Ok(())
    }

    fn delete_book(&mut self) -> Result<()> {
        self.header("DELETE BOOK")?;
        let Some(id) = self.ask_id("Enter Book ID to delete: ")? else {
            return Ok(());
        };

        let book = match self.store.find_for_confirmation(id) {
            Ok(book) => book,
            Err(Error::NotFound(_)) => {
                writeln!(self.output, "\nBook not found!")?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.show_details("Book Details", &book)?;

        if !self.confirm("\nDelete this book? (Y/N): ")? {
            writeln!(self.output, "\nDeletion cancelled.")?;
            return Ok(());
        }

        self.store.delete(id)?;
        writeln!(self.output, "\nBook deleted successfully!")?;
        Ok(())
    }

    fn display_books(&mut self) -> Result<()> {
        let mut cursor = PageCursor::new(self.store.count()?);

        while let Some(page) = cursor.page() {
            let view = self.store.list_page(page)?;
            self.header("DISPLAY ALL BOOKS")?;
            writeln!(self.output, "Page {} of {}\n", view.page, view.total_pages)?;
            writeln!(
                self.output,
                "{:>6}{:>30}{:>20}{:>10}{:>10}{:>12}",
                "ID", "Title", "Author", "Price", "Qty", "Status"
            )?;
            writeln!(self.output, "{}", "-".repeat(88))?;
            for book in &view.records {
                writeln!(
                    self.output,
                    "  {}{:>30}{:>20}{:>10}{:>10}{:>12}",
                    book.id(),
                    clip(book.title(), 28),
                    clip(book.author(), 18),
                    book.price().to_string(),
                    book.quantity(),
                    book.status().as_str()
                )?;
            }
            writeln!(self.output, "\n----------------------------------------")?;
            writeln!(
                self.output,
                "Total Books: {} | Page {} of {}",
                view.total_records, view.page, view.total_pages
            )?;
            writeln!(self.output, "N: Next Page | P: Previous Page | Q: Return to Main Menu")?;

            let Some(line) = self.prompt("Enter your choice: ")? else {
                return Ok(());
            };
            match PageCommand::parse(&line) {
                Some(command) => {
                    if !cursor.handle(command) {
                        return Ok(());
                    }
                }
                None => writeln!(self.output, "\nInvalid choice!")?,
            }
        }

        self.header("DISPLAY ALL BOOKS")?;
        writeln!(self.output, "No books found in the system!")?;
        Ok(())
    }

    // ========================================================================
    // Input helpers
    // ========================================================================

    fn header(&mut self, title: &str) -> Result<()> {
        writeln!(self.output, "\n=======================================")?;
        writeln!(self.output, "       {}", title)?;
        writeln!(self.output, "=======================================")?;
        Ok(())
    }

    /// One trimmed line, or `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Re-prompt until `parse` accepts the input.
    fn ask<T>(
        &mut self,
        message: &str,
        invalid: ValidationError,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        let mut message = message.to_string();
        loop {
            let Some(line) = self.prompt(&message)? else {
                return Ok(None);
            };
            if let Some(value) = parse(&line) {
                return Ok(Some(value));
            }
            message = format!("{}. Try again: ", invalid);
        }
    }

    /// Like [`ask`](Self::ask) but an empty line means "keep": `Some(None)`.
    fn ask_optional<T>(
        &mut self,
        field: &str,
        invalid: ValidationError,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<Option<T>>> {
        let message = format!("Enter {} (press Enter to keep current): ", field);
        self.ask(&message, invalid, |s| {
            if s.is_empty() {
                Some(None)
            } else {
                parse(s).map(Some)
            }
        })
    }

    fn ask_id(&mut self, message: &str) -> Result<Option<BookId>> {
        self.ask(message, ValidationError::Id, |s| {
            s.parse::<u32>().ok().map(BookId::new).filter(BookId::is_valid)
        })
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(self
            .prompt(message)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    fn show_details(&mut self, heading: &str, book: &Book) -> Result<()> {
        writeln!(self.output, "\n{}:", heading)?;
        writeln!(self.output, "ID: {}", book.id())?;
        writeln!(self.output, "Title: {}", book.title())?;
        writeln!(self.output, "Author: {}", book.author())?;
        writeln!(self.output, "Price: ${}", book.price())?;
        writeln!(self.output, "Quantity: {}", book.quantity())?;
        writeln!(self.output, "Status: {}", book.status())?;
        Ok(())
    }
}

fn owned_if(valid: fn(&str) -> bool) -> impl Fn(&str) -> Option<String> {
    move |s: &str| valid(s).then(|| s.to_string())
}

fn parse_price(s: &str) -> Option<Price> {
    s.parse::<Price>().ok().filter(|p| valid_price(*p))
}

fn parse_quantity(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|q| valid_quantity(*q))
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width - 3).collect();
        clipped.push_str("...");
        clipped
    }
}
