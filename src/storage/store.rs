//! Record Store - the catalog API over one slot file.
//!
//! The [`RecordStore`] provides:
//! - Linear-scan reads (`scan_all`, `find_by_id`, `list_page`)
//! - Appends with monotonically increasing ids
//! - Atomic rewrites through a temp file (`replace_all`)
//! - Backup and restore around destructive changes

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::common::{BookId, Error, Result, StoreConfig, ValidationError};
use crate::pagination;
use crate::record::{Book, BookDraft, BookUpdate};
use crate::storage::file_ops::{FileOps, OsFileOps};
use crate::storage::record_file::{RecordFile, Scan};
use crate::storage::sequence::IdSequence;
use crate::validation::{validate_draft, validate_update};

/// One page of records as returned by [`RecordStore::list_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// Records on this page, in physical order.
    pub records: Vec<Book>,
    /// The 1-based page actually shown (requests are clamped).
    pub page: u64,
    pub total_pages: u64,
    pub total_records: u64,
}

/// Owns the catalog's data file and every file derived from it.
///
/// # Files
/// ```text
/// books.dat      live slots
/// books.dat.tmp  next version, only present during replace_all
/// books.dat.bak  snapshot taken before the last destructive change
/// books.dat.part copy in progress, renamed over its target once complete
/// books.dat.seq  highest id ever assigned
/// ```
///
/// # Commit protocol
/// `replace_all` writes the new content to the temp file and syncs it,
/// closes the live handle, removes the live file and renames the temp file
/// into place. If the rename fails the store puts a readable live file back,
/// from the backup if one was taken for this change, otherwise by copying
/// the temp file. If that fails too the store is poisoned and every later
/// call returns [`Error::Poisoned`].
///
/// Whole-file copies never write the live or backup path directly. They go
/// to the scratch file, which is synced and then renamed over the target,
/// so a live file that exists is always complete.
///
/// # Thread Safety
/// `RecordStore` is **single-threaded**. Every operation takes `&mut self`,
/// so operations never overlap.
///
/// # Usage
/// ```no_run
/// use catalogdb::{BookDraft, BookUpdate, RecordStore, StoreConfig};
///
/// let mut store = RecordStore::open(StoreConfig::in_dir("/tmp/catalog"))?;
/// let id = store.add(BookDraft::new("Go Basics", "Jane Doe", "19.99".parse()?, 3))?;
/// store.update(id, BookUpdate::default().quantity(0))?;
/// store.delete(id)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RecordStore<F: FileOps = OsFileOps> {
    config: StoreConfig,
    ops: F,
    /// Live file handle; `None` between a commit and the next operation.
    file: Option<RecordFile>,
    sequence: IdSequence,
    /// Highest id ever assigned by this store.
    high_water: BookId,
    /// Highest id known to be in the sequence file.
    persisted_high_water: BookId,
    /// A backup was taken for the mutation in progress.
    backup_fresh: bool,
    poisoned: bool,
}

impl RecordStore<OsFileOps> {
    /// Open the store described by `config`, creating an empty data file if
    /// none exists.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_with_ops(config, OsFileOps)
    }
}

impl<F: FileOps> RecordStore<F> {
    /// Open with a custom [`FileOps`] implementation.
    ///
    /// A commit interrupted by a crash is finished first: if the live file
    /// is missing, the temp file (complete by construction) or the backup is
    /// moved into place. A stale temp file next to a live file is removed.
    pub fn open_with_ops(config: StoreConfig, ops: F) -> Result<Self> {
        recover_interrupted_commit(&config, &ops)?;

        let file = RecordFile::open_or_create(&config.data_path, config.sync_writes)?;
        let sequence = IdSequence::new(&config.sequence_path, config.sync_writes);

        let mut store = Self {
            config,
            ops,
            file: Some(file),
            sequence,
            high_water: BookId::INVALID,
            persisted_high_water: BookId::INVALID,
            backup_fresh: false,
            poisoned: false,
        };

        let scanned = store.max_id()?;
        let stored = store.sequence.load();
        store.persisted_high_water = stored.unwrap_or(BookId::INVALID);
        store.high_water = stored.map_or(scanned, |stored| stored.max(scanned));

        let records = store.count()?;
        info!(
            path = %store.config.data_path.display(),
            records,
            high_water = store.high_water.0,
            "opened catalog"
        );
        Ok(store)
    }

    /// The configuration this store was opened with.
    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Iterate every record in physical order, starting from the first slot.
    pub fn scan_all(&mut self) -> Result<Scan<'_>> {
        self.file()?.scan()
    }

    /// Linear scan for `id`.
    ///
    /// # Errors
    /// `Error::NotFound` if no live record has this id.
    pub fn find_by_id(&mut self, id: BookId) -> Result<Book> {
        for book in self.scan_all()? {
            let book = book?;
            if book.id() == id {
                return Ok(book);
            }
        }
        Err(Error::NotFound(id))
    }

    /// Look up a record to show the user before deleting it.
    pub fn find_for_confirmation(&mut self, id: BookId) -> Result<Book> {
        self.find_by_id(id)
    }

    /// Number of live records.
    pub fn count(&mut self) -> Result<u64> {
        Ok(self.file()?.slot_count())
    }

    /// Ids of all live records.
    pub fn existing_ids(&mut self) -> Result<HashSet<BookId>> {
        self.scan_all()?.map(|book| book.map(|b| b.id())).collect()
    }

    /// The id the next `add` will assign.
    ///
    /// Reads the last physical slot; an empty file yields 1. Ids freed by
    /// deletion, including the tail record's, are never handed out again.
    pub fn next_id(&mut self) -> Result<BookId> {
        let last = self.file()?.read_last_id()?.unwrap_or(BookId::INVALID);
        Ok(last.max(self.high_water).next())
    }

    /// Records on `page` (1-based, clamped to the valid range).
    ///
    /// # Errors
    /// `Error::EmptyStore` when there is nothing to list.
    pub fn list_page(&mut self, page: u64) -> Result<PageView> {
        let total_records = self.count()?;
        if total_records == 0 {
            return Err(Error::EmptyStore);
        }

        let total_pages = pagination::total_pages(total_records);
        let page = page.clamp(1, total_pages);
        let file = self.file()?;
        let records = pagination::page_range(page, total_records)
            .map(|index| file.read_slot(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(PageView {
            records,
            page,
            total_pages,
            total_records,
        })
    }

    // ========================================================================
    // Catalog operations
    // ========================================================================

    /// Validate `draft`, assign the next id and append it.
    pub fn add(&mut self, draft: BookDraft) -> Result<BookId> {
        validate_draft(&draft)?;

        let id = self.next_id()?;
        let book = Book::from_draft(id, draft);
        self.append(&book)?;

        info!(id = %id, title = book.title(), "added book");
        Ok(id)
    }

    /// Same as [`find_by_id`](Self::find_by_id).
    pub fn search(&mut self, id: BookId) -> Result<Book> {
        self.find_by_id(id)
    }

    /// Replace the supplied fields of record `id` and return the new record.
    ///
    /// Fields left as `None` keep their stored value. The status follows the
    /// resulting quantity. All other records keep their slot order.
    ///
    /// # Errors
    /// - `Error::NotFound` if `id` is absent (nothing is written)
    /// - `Error::Validation` if a supplied field is out of range
    /// - I/O errors from the rewrite
    pub fn update(&mut self, id: BookId, update: BookUpdate) -> Result<Book> {
        let mut records = self.load_all()?;
        let position = records
            .iter()
            .position(|b| b.id() == id)
            .ok_or(Error::NotFound(id))?;
        validate_update(&update)?;

        records[position].apply(update);
        let revised = records[position].clone();

        self.create_backup()?;
        self.replace_all(&records)?;

        info!(id = %id, status = %revised.status(), "updated book");
        Ok(revised)
    }

    /// Remove record `id`, compacting the file. Returns the removed record.
    ///
    /// A backup is taken first; if the commit fails the backup is restored
    /// before the error is returned.
    pub fn delete(&mut self, id: BookId) -> Result<Book> {
        let mut records = self.load_all()?;
        let position = records
            .iter()
            .position(|b| b.id() == id)
            .ok_or(Error::NotFound(id))?;
        let removed = records.remove(position);

        self.create_backup()?;
        self.replace_all(&records)?;

        info!(id = %id, remaining = records.len(), "deleted book");
        Ok(removed)
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Write one record at the end of the file and sync it.
    ///
    /// # Errors
    /// `Error::Validation` if a field is out of range, or if the id is not
    /// above every id assigned so far.
    pub fn append(&mut self, book: &Book) -> Result<()> {
        validate_draft(&book.to_draft())?;
        if book.id() <= self.high_water || !book.id().is_valid() {
            return Err(ValidationError::Id.into());
        }

        let index = self.file()?.append(book)?;
        debug!(id = %book.id(), slot = index, "appended slot");

        self.high_water = book.id();
        if let Err(e) = self.persist_high_water() {
            // Retried before the next rewrite, the only way the tail can go.
            warn!(error = %e, "failed to persist id high water mark");
        }
        Ok(())
    }

    /// Atomically replace the whole file with `records`, in the given order.
    ///
    /// The live handle is closed and reopened lazily by the next operation.
    pub fn replace_all(&mut self, records: &[Book]) -> Result<()> {
        let result = self.replace_all_inner(records);
        self.backup_fresh = false;
        result
    }

    /// Copy the live file to the backup path.
    ///
    /// The live handle is synced and closed first so the copy sees every
    /// committed slot.
    pub fn create_backup(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.backup_fresh = false;
        self.close()?;

        let bytes = copy_into_place(
            &self.ops,
            &self.config,
            &self.config.data_path,
            &self.config.backup_path,
        )?;

        self.backup_fresh = true;
        debug!(bytes, path = %self.config.backup_path.display(), "created backup");
        Ok(())
    }

    /// Replace the live file with the backup.
    ///
    /// # Errors
    /// - I/O `NotFound` if there is no backup (nothing is changed)
    /// - `Error::RecoveryFailed` if the live file was removed but the backup
    ///   could not be put in its place
    pub fn restore_backup(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.close()?;

        match self.install_backup() {
            Ok(()) => {
                info!(path = %self.config.data_path.display(), "restored backup");
                Ok(())
            }
            // A live file that survived the failure is complete
            Err(e) if self.config.data_path.exists() => Err(e.into()),
            Err(e) => {
                error!(error = %e, "live file lost while restoring backup");
                self.poisoned = true;
                Err(Error::RecoveryFailed {
                    source: e,
                    recovery: io::Error::new(io::ErrorKind::NotFound, "data file missing"),
                })
            }
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn replace_all_inner(&mut self, records: &[Book]) -> Result<()> {
        self.ensure_usable()?;
        for book in records {
            validate_draft(&book.to_draft())?;
        }
        // Dropping the tail record must not let its id come back after a restart
        self.persist_high_water()?;

        // 1. Write the new content to the temp file
        if let Err(e) = self.write_temp(records) {
            warn!(error = %e, "failed to write temp file");
            self.discard_temp();
            return Err(e);
        }

        // 2. Close the live file
        if let Err(e) = self.close() {
            self.discard_temp();
            return Err(e);
        }

        // 3. Swap
        self.commit()?;

        debug!(records = records.len(), "replaced all records");
        Ok(())
    }

    fn write_temp(&self, records: &[Book]) -> Result<()> {
        let mut temp = RecordFile::create(&self.config.temp_path, self.config.sync_writes)?;
        temp.append_all(records)
    }

    fn commit(&mut self) -> Result<()> {
        let data = &self.config.data_path;
        let temp = &self.config.temp_path;

        if let Err(e) = remove_if_exists(&self.ops, data) {
            warn!(error = %e, "could not remove live file; keeping it");
            self.discard_temp();
            return Err(e.into());
        }

        if let Err(cause) = self.ops.rename(temp, data) {
            error!(error = %cause, "commit rename failed; recovering live file");
            return Err(self.recover_live_file(cause));
        }

        Ok(())
    }

    /// Called with the live file removed and the temp file complete.
    fn recover_live_file(&mut self, cause: io::Error) -> Error {
        if self.backup_fresh {
            match self.install_backup() {
                Ok(()) => {
                    warn!("live file restored from backup");
                    self.discard_temp();
                    return Error::Io(cause);
                }
                Err(e) => warn!(error = %e, "backup restore failed; trying temp copy"),
            }
        }

        let rebuilt = copy_into_place(
            &self.ops,
            &self.config,
            &self.config.temp_path,
            &self.config.data_path,
        );
        match rebuilt {
            Ok(_) => {
                warn!("live file rebuilt from temp file");
                self.discard_temp();
                Error::Io(cause)
            }
            Err(recovery) => {
                error!(error = %recovery, "recovery failed; store is unusable");
                self.poisoned = true;
                Error::RecoveryFailed {
                    source: cause,
                    recovery,
                }
            }
        }
    }

    /// Move the backup over the live path, copying if the rename fails.
    fn install_backup(&mut self) -> io::Result<()> {
        let data = &self.config.data_path;
        let backup = &self.config.backup_path;

        if !backup.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no backup to restore",
            ));
        }

        remove_if_exists(&self.ops, data)?;
        if let Err(e) = self.ops.rename(backup, data) {
            warn!(error = %e, "backup rename failed; copying instead");
            copy_into_place(&self.ops, &self.config, backup, data)?;
        }

        self.backup_fresh = false;
        Ok(())
    }

    fn discard_temp(&self) {
        let temp = &self.config.temp_path;
        if temp.exists() {
            if let Err(e) = self.ops.remove_file(temp) {
                warn!(error = %e, path = %temp.display(), "could not remove temp file");
            }
        }
    }

    /// Write the high water mark to the sequence file if it is behind.
    fn persist_high_water(&mut self) -> Result<()> {
        if self.persisted_high_water < self.high_water {
            self.sequence.store(self.high_water)?;
            self.persisted_high_water = self.high_water;
        }
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<Book>> {
        self.scan_all()?.collect()
    }

    fn max_id(&mut self) -> Result<BookId> {
        let mut max = BookId::INVALID;
        for book in self.scan_all()? {
            max = max.max(book?.id());
        }
        Ok(max)
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::Poisoned)
        } else {
            Ok(())
        }
    }

    /// The live handle, reopening it if a commit closed it.
    fn file(&mut self) -> Result<&mut RecordFile> {
        self.ensure_usable()?;
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                debug!(path = %self.config.data_path.display(), "reopening data file");
                RecordFile::open(&self.config.data_path, self.config.sync_writes)?
            }
        };
        Ok(self.file.insert(file))
    }

    /// Sync and drop the live handle.
    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            if self.config.sync_writes {
                file.sync()?;
            }
        }
        Ok(())
    }
}

fn remove_if_exists<F: FileOps>(ops: &F, path: &Path) -> io::Result<()> {
    match ops.remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Copy `from` over `to` through the scratch file.
///
/// `to` is either left untouched or replaced by a complete, synced copy. A
/// partial scratch file is removed on failure.
fn copy_into_place<F: FileOps>(
    ops: &F,
    config: &StoreConfig,
    from: &Path,
    to: &Path,
) -> io::Result<u64> {
    let scratch = &config.scratch_path;
    let copied = ops.copy(from, scratch).and_then(|bytes| {
        if config.sync_writes {
            File::open(scratch)?.sync_all()?;
        }
        ops.rename(scratch, to)?;
        Ok(bytes)
    });

    if copied.is_err() {
        if let Err(e) = remove_if_exists(ops, scratch) {
            warn!(error = %e, path = %scratch.display(), "could not remove scratch file");
        }
    }
    copied
}

/// Finish a commit that a crash cut short.
///
/// Apart from appends, the live file only changes by rename of a complete
/// file, so when it exists it wins over a temp file, which may have been cut
/// short.
fn recover_interrupted_commit<F: FileOps>(config: &StoreConfig, ops: &F) -> Result<()> {
    let data = &config.data_path;
    let temp = &config.temp_path;
    let scratch = &config.scratch_path;

    if scratch.exists() {
        warn!(path = %scratch.display(), "removing unfinished copy");
        ops.remove_file(scratch)?;
    }

    if data.exists() {
        if temp.exists() {
            warn!(path = %temp.display(), "removing stale temp file");
            ops.remove_file(temp)?;
        }
        return Ok(());
    }

    if temp.exists() {
        warn!(path = %temp.display(), "live file missing; promoting temp file");
        ops.rename(temp, data)?;
    } else if config.backup_path.exists() {
        warn!(path = %config.backup_path.display(), "live file missing; restoring backup");
        copy_into_place(ops, config, &config.backup_path, data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Price, Status};
    use tempfile::tempdir;

    fn draft(title: &str, qty: u32) -> BookDraft {
        BookDraft::new(title, "Jane Doe", Price::from_cents(1999), qty)
    }

    fn open(dir: &Path) -> RecordStore {
        RecordStore::open(StoreConfig::in_dir(dir).with_sync_writes(false)).unwrap()
    }

    fn titles(store: &mut RecordStore) -> Vec<String> {
        store
            .scan_all()
            .unwrap()
            .map(|b| b.unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn test_open_creates_empty_store() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());

        assert!(store.config().data_path.exists());
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.next_id().unwrap(), BookId::FIRST);
        assert!(matches!(store.list_page(1), Err(Error::EmptyStore)));
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());

        assert_eq!(store.add(draft("First", 1)).unwrap(), BookId::new(1));
        assert_eq!(store.add(draft("Second", 0)).unwrap(), BookId::new(2));
        assert_eq!(store.next_id().unwrap(), BookId::new(3));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_add_rejects_invalid_draft() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());

        let err = store.add(draft("ab", 1)).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Title)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_rejects_reused_id() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        store.add(draft("First", 1)).unwrap();

        let dup = Book::from_draft(BookId::new(1), draft("Again", 1));
        assert!(matches!(
            store.append(&dup),
            Err(Error::Validation(ValidationError::Id))
        ));
    }

    #[test]
    fn test_update_keeps_order_and_unsupplied_fields() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        for title in ["Alpha", "Bravo", "Charlie"] {
            store.add(draft(title, 2)).unwrap();
        }

        let revised = store
            .update(BookId::new(2), BookUpdate::default().title("Bravo II").quantity(0))
            .unwrap();
        assert_eq!(revised.author(), "Jane Doe");
        assert_eq!(revised.status(), Status::Out);

        assert_eq!(titles(&mut store), vec!["Alpha", "Bravo II", "Charlie"]);
        assert!(!store.config().temp_path.exists());
        assert!(store.config().backup_path.exists());
    }

    #[test]
    fn test_update_missing_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        store.add(draft("Alpha", 1)).unwrap();

        let err = store
            .update(BookId::new(9), BookUpdate::default().quantity(3))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == BookId::new(9)));
        assert!(!store.config().temp_path.exists());
    }

    #[test]
    fn test_update_rejects_invalid_field() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        store.add(draft("Alpha", 1)).unwrap();

        let err = store
            .update(BookId::new(1), BookUpdate::default().quantity(5000))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Quantity)));
        assert_eq!(store.search(BookId::new(1)).unwrap().quantity(), 1);
    }

    #[test]
    fn test_delete_compacts() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        for title in ["Alpha", "Bravo", "Charlie"] {
            store.add(draft(title, 2)).unwrap();
        }

        let removed = store.delete(BookId::new(2)).unwrap();
        assert_eq!(removed.title(), "Bravo");
        assert_eq!(titles(&mut store), vec!["Alpha", "Charlie"]);
        assert_eq!(
            std::fs::metadata(&store.config().data_path).unwrap().len(),
            2 * crate::common::config::SLOT_SIZE as u64
        );
    }

    #[test]
    fn test_next_id_survives_tail_delete_and_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
            store.add(draft("Bravo", 1)).unwrap();
            store.delete(BookId::new(2)).unwrap();
            assert_eq!(store.next_id().unwrap(), BookId::new(3));
        }

        let mut store = open(dir.path());
        assert_eq!(store.next_id().unwrap(), BookId::new(3));
    }

    #[test]
    fn test_next_id_falls_back_to_scan_without_sequence() {
        let dir = tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
            store.add(draft("Bravo", 1)).unwrap();
        }
        std::fs::remove_file(dir.path().join("books.dat.seq")).unwrap();

        let mut store = open(dir.path());
        assert_eq!(store.next_id().unwrap(), BookId::new(3));
    }

    #[test]
    fn test_backup_and_restore() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        store.add(draft("Alpha", 1)).unwrap();
        store.create_backup().unwrap();
        store.add(draft("Bravo", 1)).unwrap();

        store.restore_backup().unwrap();
        assert_eq!(titles(&mut store), vec!["Alpha"]);
        assert!(!store.config().backup_path.exists());
    }

    #[test]
    fn test_restore_without_backup_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        store.add(draft("Alpha", 1)).unwrap();

        assert!(matches!(store.restore_backup(), Err(Error::Io(_))));
        assert_eq!(titles(&mut store), vec!["Alpha"]);
    }

    #[test]
    fn test_list_page_clamps() {
        let dir = tempdir().unwrap();
        let mut store = open(dir.path());
        for i in 0..7 {
            store.add(draft(&format!("Book {i}"), 1)).unwrap();
        }

        let view = store.list_page(9).unwrap();
        assert_eq!(view.page, 2);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.total_records, 7);
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.records[0].title(), "Book 5");

        assert_eq!(store.list_page(0).unwrap().page, 1);
    }

    #[test]
    fn test_open_promotes_orphaned_temp() {
        let dir = tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
            store.add(draft("Bravo", 1)).unwrap();
        }
        // Crash between removing the live file and renaming the temp file
        let data = dir.path().join("books.dat");
        std::fs::rename(&data, dir.path().join("books.dat.tmp")).unwrap();

        let mut store = open(dir.path());
        assert_eq!(titles(&mut store), vec!["Alpha", "Bravo"]);
        assert!(!store.config().temp_path.exists());
    }

    #[test]
    fn test_open_removes_stale_temp() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("books.dat.tmp"), [0u8; 3]).unwrap();
        std::fs::write(dir.path().join("books.dat"), b"").unwrap();

        let store = open(dir.path());
        assert!(!store.config().temp_path.exists());
    }

    #[test]
    fn test_open_discards_unfinished_copy() {
        let dir = tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
        }
        std::fs::write(dir.path().join("books.dat.part"), [0u8; 150]).unwrap();

        let mut store = open(dir.path());
        assert_eq!(titles(&mut store), vec!["Alpha"]);
        assert!(!store.config().scratch_path.exists());
    }

    #[test]
    fn test_open_restores_backup_when_live_missing() {
        let dir = tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
            store.add(draft("Bravo", 1)).unwrap();
            store.create_backup().unwrap();
        }
        std::fs::remove_file(dir.path().join("books.dat")).unwrap();

        let mut store = open(dir.path());
        assert_eq!(titles(&mut store), vec!["Alpha", "Bravo"]);
        assert!(store.config().backup_path.exists());
        assert!(!store.config().scratch_path.exists());
    }

    #[test]
    fn test_rewrite_waits_for_sequence_file() {
        let dir = tempdir().unwrap();
        // A directory where the sequence scratch file goes makes every store fail
        let blocker = dir.path().join("books.dat.seq.tmp");
        {
            let mut store = open(dir.path());
            store.add(draft("Alpha", 1)).unwrap();
            std::fs::create_dir(&blocker).unwrap();
            store.add(draft("Bravo", 1)).unwrap();

            assert!(matches!(store.delete(BookId::new(2)), Err(Error::Io(_))));
            assert_eq!(titles(&mut store), vec!["Alpha", "Bravo"]);

            std::fs::remove_dir(&blocker).unwrap();
            store.delete(BookId::new(2)).unwrap();
        }

        let mut store = open(dir.path());
        assert_eq!(store.next_id().unwrap(), BookId::new(3));
    }
}
