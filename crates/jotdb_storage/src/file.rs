//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::model::StoreFile;
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options controlling how a [`FileBackend`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Emit indented JSON.
    pub pretty: bool,
    /// Fsync the file and its directory on every write.
    pub sync_on_write: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            sync_on_write: true,
        }
    }
}

/// A file-based storage backend.
///
/// The store is kept as a single JSON document. Data survives process
/// restarts.
///
/// # Durability
///
/// Writes go to a sibling temporary file which is then renamed over the
/// store, so readers see either the old or the new store, never a partial
/// one. With `sync_on_write` the temporary file and the directory are
/// fsynced around the rename.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
/// Other processes writing the same file are not coordinated with.
///
/// # Example
///
/// ```no_run
/// use jotdb_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("data/store.json")).unwrap();
/// let file = backend.read().unwrap();
/// backend.write(&file).unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    options: FileOptions,
    io_lock: RwLock<()>,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// Missing parent directories are created, and a missing file is
    /// bootstrapped with an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if directories or the file cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_with_options(path, FileOptions::default())
    }

    /// Opens or creates a file backend with custom write options.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no file name, or if directories or
    /// the file cannot be created.
    pub fn open_with_options(path: &Path, options: FileOptions) -> StorageResult<Self> {
        let file_name = path.file_name().ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("store path has no file name: {}", path.display()),
            ))
        })?;

        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");

        let backend = Self {
            path: path.to_path_buf(),
            temp_path: path.with_file_name(temp_name),
            options,
            io_lock: RwLock::new(()),
        };
        backend.bootstrap()?;
        Ok(backend)
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the write options.
    #[must_use]
    pub fn options(&self) -> FileOptions {
        self.options
    }

    fn bootstrap(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if !self.path.exists() {
            debug!(path = %self.path.display(), "bootstrapping empty store");
            self.write(&StoreFile::new())?;
        }

        Ok(())
    }

    /// Syncs the directory holding the store so the rename is durable.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                File::open(parent)?.sync_all()?;
            }
            _ => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        // NTFS journals metadata updates
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> StorageResult<StoreFile> {
        let _guard = self.io_lock.read();
        let bytes = fs::read(&self.path)?;
        StoreFile::from_json(&bytes)
    }

    fn write(&self, file: &StoreFile) -> StorageResult<()> {
        let bytes = file.to_json(self.options.pretty)?;

        let _guard = self.io_lock.write();

        let mut temp = File::create(&self.temp_path)?;
        temp.write_all(&bytes)?;
        if self.options.sync_on_write {
            temp.sync_all()?;
        }
        drop(temp);

        fs::rename(&self.temp_path, &self.path)?;

        if self.options.sync_on_write {
            self.sync_directory()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectionState;
    use tempfile::tempdir;

    fn sample_file() -> StoreFile {
        let mut file = StoreFile::new();
        file.collections.insert("col".into(), CollectionState::new());
        file
    }

    #[test]
    fn file_bootstraps_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert!(path.exists());
        assert!(backend.read().unwrap().collections.is_empty());

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"collections": {}}));
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.write(&sample_file()).unwrap();

        assert_eq!(backend.read().unwrap(), sample_file());
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.write(&sample_file()).unwrap();
        }

        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.read().unwrap(), sample_file());
        }
    }

    #[test]
    fn file_reopen_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"collections":{"a":{"id":3,"documents":{}}}}"#).unwrap();

        let backend = FileBackend::open(&path).unwrap();
        let state = backend.read().unwrap();
        assert_eq!(state.collection("a").unwrap().next_id.as_u64(), 3);
    }

    #[test]
    fn file_malformed_content_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{broken").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert!(matches!(backend.read(), Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn file_pretty_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let options = FileOptions {
            pretty: true,
            sync_on_write: false,
        };
        let backend = FileBackend::open_with_options(&path, options).unwrap();
        backend.write(&sample_file()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(backend.read().unwrap(), sample_file());
    }

    #[test]
    fn file_path_without_name_fails() {
        let result = FileBackend::open(Path::new("/"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
