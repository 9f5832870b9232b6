//! File-backed key-value store for tasklist.
//!
//! This crate provides [`FileStore`], which implements the `KeyValueStore`
//! trait from `tasklist-core` on top of a plain directory:
//!
//! - One file per key, named after the key
//! - Atomic replacement (write to a temporary file, then rename)
//! - Missing files read as "no value"
//!
//! # Example
//!
//! ```no_run
//! use tasklist_core::kv::KeyValueStore;
//! use tasklist_storage::FileStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::open("/tmp/tasklist")?;
//! store.set("showCompleted", b"true")?;
//! assert_eq!(store.get("showCompleted")?, Some(b"true".to_vec()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tasklist_core::kv::{KeyValueStore, KvError};
use tempfile::NamedTempFile;

/// Directory-backed key-value store
///
/// Keys map directly to file names, so they are restricted to ASCII
/// alphanumerics, `_`, `-` and `.`, and may not start with `.`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// The directory holding the stored values
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
        if is_valid_key(key) {
            Ok(self.dir.join(key))
        } else {
            Err(KvError::InvalidKey(key.to_string()))
        }
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

fn io_error(key: &str, source: io::Error) -> KvError {
    KvError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(key, error)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        let path = self.path_for(key)?;

        // Same directory as the target so the rename stays on one filesystem
        let mut file = NamedTempFile::new_in(&self.dir).map_err(|e| io_error(key, e))?;
        file.write_all(value).map_err(|e| io_error(key, e))?;
        file.as_file().sync_all().map_err(|e| io_error(key, e))?;
        file.persist(&path).map_err(|e| io_error(key, e.error))?;

        tracing::trace!(key, bytes = value.len(), "Wrote value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_directory() {
        let (dir, store) = temp_store();
        assert!(dir.path().join("data").is_dir());
        assert_eq!(store.dir(), dir.path().join("data"));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.get("todoItems"), Ok(None)));
    }

    #[test]
    fn set_then_get() {
        let (_dir, store) = temp_store();
        store.set("newItemText", b"\"eggs\"").unwrap();
        assert_eq!(store.get("newItemText").unwrap(), Some(b"\"eggs\"".to_vec()));
    }

    #[test]
    fn set_replaces_previous_value() {
        let (_dir, store) = temp_store();
        store.set("showCompleted", b"true").unwrap();
        store.set("showCompleted", b"false").unwrap();
        assert_eq!(store.get("showCompleted").unwrap(), Some(b"false".to_vec()));
    }

    #[test]
    fn values_survive_reopen() {
        let (dir, store) = temp_store();
        store.set("todoItems", b"[]").unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(reopened.get("todoItems").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn no_temporary_files_left_behind() {
        let (_dir, store) = temp_store();
        store.set("todoItems", b"[]").unwrap();
        store.set("todoItems", b"[1]").unwrap();

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("todoItems")]);
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let (_dir, store) = temp_store();
        for key in ["", "../evil", ".hidden", "a/b", "spaced key"] {
            assert!(
                matches!(store.set(key, b"x"), Err(KvError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
            assert!(matches!(store.get(key), Err(KvError::InvalidKey(_))));
        }
    }

    #[test]
    fn accepts_dotted_and_dashed_keys() {
        assert!(is_valid_key("todo-items.v1"));
        assert!(is_valid_key("show_completed"));
    }
}
