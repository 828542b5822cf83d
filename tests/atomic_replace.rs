//! Fault-injection tests for the commit protocol.
//!
//! A [`FaultyOps`] fails the next N calls of a chosen file operation. After
//! every simulated failure the live file must hold either the complete old
//! content or the complete new content.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

use catalogdb::{
    BookDraft, BookId, BookUpdate, Error, FileOps, OsFileOps, Price, RecordFile, RecordStore,
    StoreConfig,
};
use tempfile::tempdir;

#[derive(Default)]
struct FaultyOps {
    fail_remove: Cell<u32>,
    fail_rename: Cell<u32>,
    /// Like `fail_rename`, but renames out of the scratch file go through.
    fail_direct_rename: Cell<u32>,
    fail_copy: Cell<u32>,
    /// Copies that write half the source and then report a full disk.
    torn_copy: Cell<u32>,
}

impl FaultyOps {
    fn trip(counter: &Cell<u32>, what: &str) -> io::Result<()> {
        let left = counter.get();
        if left > 0 {
            counter.set(left - 1);
            return Err(io::Error::new(io::ErrorKind::Other, format!("injected {what} failure")));
        }
        Ok(())
    }
}

impl FileOps for FaultyOps {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        Self::trip(&self.fail_remove, "remove")?;
        OsFileOps.remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        Self::trip(&self.fail_rename, "rename")?;
        if from.extension().map_or(true, |ext| ext != "part") {
            Self::trip(&self.fail_direct_rename, "rename")?;
        }
        OsFileOps.rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        Self::trip(&self.fail_copy, "copy")?;
        if Self::trip(&self.torn_copy, "copy").is_err() {
            let bytes = fs::read(from)?;
            fs::write(to, &bytes[..bytes.len() / 2])?;
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        OsFileOps.copy(from, to)
    }
}

const ALWAYS: u32 = u32::MAX;

fn seeded_store<'a>(dir: &Path, ops: &'a FaultyOps) -> RecordStore<&'a FaultyOps> {
    let config = StoreConfig::in_dir(dir).with_sync_writes(false);
    let mut store = RecordStore::open_with_ops(config, ops).unwrap();
    for title in ["Alpha", "Bravo", "Charlie"] {
        store
            .add(BookDraft::new(title, "Jane Doe", Price::from_cents(500), 2))
            .unwrap();
    }
    store
}

/// Titles in the live file, read without going through the store.
fn live_titles(dir: &Path) -> Vec<String> {
    let mut file = RecordFile::open(dir.join("books.dat"), false).unwrap();
    file.scan()
        .unwrap()
        .map(|b| b.unwrap().title().to_string())
        .collect()
}

fn old_content() -> Vec<String> {
    vec!["Alpha".into(), "Bravo".into(), "Charlie".into()]
}

/// Remove step fails: the live file is untouched and the temp file is gone.
#[test]
fn test_remove_failure_keeps_old_file() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    ops.fail_remove.set(1);
    let err = store.delete(BookId::new(2)).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert_eq!(live_titles(dir.path()), old_content());
    assert!(!dir.path().join("books.dat.tmp").exists());
    assert_eq!(store.count().unwrap(), 3);
}

/// Rename fails once during delete: the backup is restored.
#[test]
fn test_rename_failure_restores_backup() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    ops.fail_direct_rename.set(1);
    let err = store.delete(BookId::new(2)).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_fatal());
    assert_eq!(live_titles(dir.path()), old_content());
    assert!(!dir.path().join("books.dat.tmp").exists());

    // The store keeps working afterwards
    store.delete(BookId::new(2)).unwrap();
    assert_eq!(live_titles(dir.path()), vec!["Alpha", "Charlie"]);
}

/// The temp and backup renames fail during update: the backup is copied
/// back instead.
#[test]
fn test_direct_renames_fail_copies_backup() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    ops.fail_direct_rename.set(ALWAYS);
    let err = store
        .update(BookId::new(1), BookUpdate::default().title("Alpha II"))
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_fatal());
    assert_eq!(live_titles(dir.path()), old_content());
    assert!(!dir.path().join("books.dat.part").exists());
}

/// With every rename failing the backup cannot even be taken, so the update
/// stops before touching the live file.
#[test]
fn test_all_renames_fail_aborts_update() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    ops.fail_rename.set(ALWAYS);
    let err = store
        .update(BookId::new(1), BookUpdate::default().title("Alpha II"))
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert_eq!(live_titles(dir.path()), old_content());
    assert!(!dir.path().join("books.dat.tmp").exists());
    assert!(!dir.path().join("books.dat.part").exists());
}

/// Without a backup, a failed rename is repaired from the temp file.
#[test]
fn test_replace_all_without_backup_installs_new_content() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    let mut books: Vec<_> = store.scan_all().unwrap().map(|b| b.unwrap()).collect();
    books.reverse();

    ops.fail_direct_rename.set(1);
    let err = store.replace_all(&books).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert_eq!(live_titles(dir.path()), vec!["Charlie", "Bravo", "Alpha"]);
    assert!(!dir.path().join("books.dat.tmp").exists());
}

/// Rename and copy both fail: the error is fatal, the store refuses work,
/// and reopening finishes the commit from the temp file.
#[test]
fn test_unrecoverable_commit_poisons_store() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    let remaining: Vec<_> = store
        .scan_all()
        .unwrap()
        .map(|b| b.unwrap())
        .filter(|b| b.id() != BookId::new(1))
        .collect();
    store.create_backup().unwrap();

    ops.fail_rename.set(ALWAYS);
    ops.fail_copy.set(ALWAYS);
    let err = store.replace_all(&remaining).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, Error::RecoveryFailed { .. }));
    assert!(matches!(store.count(), Err(Error::Poisoned)));
    assert!(matches!(store.search(BookId::new(2)), Err(Error::Poisoned)));

    // Neither the old nor the new content was lost
    assert!(dir.path().join("books.dat.tmp").exists());
    assert!(dir.path().join("books.dat.bak").exists());

    drop(store);
    let mut reopened =
        RecordStore::open(StoreConfig::in_dir(dir.path()).with_sync_writes(false)).unwrap();
    assert_eq!(reopened.count().unwrap(), 2);
    assert_eq!(live_titles(dir.path()), vec!["Bravo", "Charlie"]);
}

/// Backup copy fails: nothing destructive has started, so nothing changes.
#[test]
fn test_backup_failure_aborts_before_rewrite() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    ops.fail_copy.set(1);
    let err = store.delete(BookId::new(3)).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert_eq!(live_titles(dir.path()), old_content());
    assert!(!dir.path().join("books.dat.tmp").exists());
    assert_eq!(store.count().unwrap(), 3);
}

/// Recovery copies run out of space halfway: no torn live file is left
/// behind, and reopening installs the complete temp file.
#[test]
fn test_torn_recovery_copy_keeps_temp_for_reopen() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);

    let remaining: Vec<_> = store
        .scan_all()
        .unwrap()
        .map(|b| b.unwrap())
        .filter(|b| b.id() != BookId::new(1))
        .collect();

    ops.fail_rename.set(ALWAYS);
    ops.torn_copy.set(ALWAYS);
    let err = store.replace_all(&remaining).unwrap_err();

    assert!(matches!(err, Error::RecoveryFailed { .. }));
    assert!(!dir.path().join("books.dat").exists());
    assert!(!dir.path().join("books.dat.part").exists());
    assert!(dir.path().join("books.dat.tmp").exists());

    drop(store);
    let mut reopened =
        RecordStore::open(StoreConfig::in_dir(dir.path()).with_sync_writes(false)).unwrap();
    assert_eq!(reopened.count().unwrap(), 2);
    assert_eq!(live_titles(dir.path()), vec!["Bravo", "Charlie"]);
    assert!(!dir.path().join("books.dat.tmp").exists());
}

/// A backup copy that tears leaves the previous backup in place.
#[test]
fn test_torn_backup_copy_keeps_previous_backup() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);
    store.create_backup().unwrap();
    store
        .add(BookDraft::new("Delta", "Jane Doe", Price::from_cents(500), 2))
        .unwrap();

    ops.torn_copy.set(1);
    assert!(matches!(store.create_backup(), Err(Error::Io(_))));
    assert!(!dir.path().join("books.dat.part").exists());

    store.restore_backup().unwrap();
    assert_eq!(live_titles(dir.path()), old_content());
}

/// Restoring the backup at open time never leaves a torn live file.
#[test]
fn test_torn_restore_on_open_retries_next_time() {
    let dir = tempdir().unwrap();
    let ops = FaultyOps::default();
    let mut store = seeded_store(dir.path(), &ops);
    store.create_backup().unwrap();
    drop(store);
    fs::remove_file(dir.path().join("books.dat")).unwrap();

    ops.torn_copy.set(1);
    let config = StoreConfig::in_dir(dir.path()).with_sync_writes(false);
    assert!(RecordStore::open_with_ops(config.clone(), &ops).is_err());
    assert!(!dir.path().join("books.dat").exists());
    assert!(!dir.path().join("books.dat.part").exists());

    let mut store = RecordStore::open_with_ops(config, &ops).unwrap();
    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(live_titles(dir.path()), old_content());
}
