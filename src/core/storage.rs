/*
 * Durable string-keyed storage for the form's persisted state. This is the
 * desktop counterpart of browser local storage: a flat map of string keys to
 * string values, kept in memory and written through to a single JSON object
 * file in the application's local configuration directory.
 *
 * Callers go through the `KeyValueStoreOperations` trait so the history and
 * selection stores can run against an in-memory map in tests.
 */
use crate::core::path_utils;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const STORAGE_FILENAME: &str = "local_storage.json";

#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoStorageDirectory,
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "Storage I/O error: {e}"),
            StorageError::Serde(e) => write!(f, "Storage serialization error: {e}"),
            StorageError::NoStorageDirectory => {
                write!(f, "Could not determine the directory for local storage")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serde(e) => Some(e),
            StorageError::NoStorageDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub trait KeyValueStoreOperations: Send + Sync {
    // Reads never fail; an absent key yields `None`.
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

pub struct CoreKeyValueStore {
    file_path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl CoreKeyValueStore {
    /*
     * Opens the store backed by `file_path`. A missing file starts an empty
     * store. A file that cannot be read or parsed is logged and also treated as
     * empty; it will be overwritten on the next write.
     */
    pub fn open(file_path: PathBuf) -> Self {
        let items = match Self::read_items(&file_path) {
            Ok(Some(items)) => {
                log::debug!(
                    "CoreKeyValueStore: Loaded {} keys from {file_path:?}.",
                    items.len()
                );
                items
            }
            Ok(None) => {
                log::debug!("CoreKeyValueStore: {file_path:?} does not exist, starting empty.");
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!(
                    "CoreKeyValueStore: Ignoring unreadable storage file {file_path:?}: {e}"
                );
                BTreeMap::new()
            }
        };
        CoreKeyValueStore {
            file_path,
            items: Mutex::new(items),
        }
    }

    // Opens the store in the application's local configuration directory.
    pub fn open_default(app_name: &str) -> Result<Self> {
        let dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(StorageError::NoStorageDirectory)?;
        Ok(Self::open(dir.join(STORAGE_FILENAME)))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn read_items(file_path: &Path) -> Result<Option<BTreeMap<String, String>>> {
        if !file_path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(file_path)?);
        let items: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        Ok(Some(items))
    }

    // Writes the full map to a sibling temp file, then renames it into place.
    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let tmp_path = self.file_path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.file_path)?;
        log::trace!("CoreKeyValueStore: Persisted {} keys.", items.len());
        Ok(())
    }
}

impl KeyValueStoreOperations for CoreKeyValueStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    // The in-memory map only changes once the file write has succeeded.
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = items.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated)?;
        *items = updated;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut updated = items.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *items = updated;
        Ok(())
    }
}

/*
 * In-memory store shared by the unit tests of the stores built on top of
 * `KeyValueStoreOperations`. Writes can be made to fail to exercise error paths.
 */
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryKeyValueStore {
    items: Mutex<std::collections::HashMap<String, String>>,
    fail_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryKeyValueStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::other("mocked write failure")));
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStoreOperations for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_item_persists_across_reopen() {
        // Arrange
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILENAME);
        let store = CoreKeyValueStore::open(path.clone());

        // Act
        store.set_item("ghostfolio_account_id", "abc").unwrap();
        store.set_item("other", "value").unwrap();
        let reopened = CoreKeyValueStore::open(path.clone());

        // Assert
        assert!(path.exists());
        assert_eq!(reopened.get_item("ghostfolio_account_id").as_deref(), Some("abc"));
        assert_eq!(reopened.get_item("other").as_deref(), Some("value"));
        assert_eq!(reopened.get_item("missing"), None);
    }

    #[test]
    fn test_remove_item_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILENAME);
        let store = CoreKeyValueStore::open(path.clone());
        store.set_item("k", "v").unwrap();

        store.remove_item("k").unwrap();
        store.remove_item("never-existed").unwrap();

        assert_eq!(store.get_item("k"), None);
        assert_eq!(CoreKeyValueStore::open(path).get_item("k"), None);
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty_and_overwritten() {
        // Arrange
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILENAME);
        fs::write(&path, "{ not json").unwrap();

        // Act
        let store = CoreKeyValueStore::open(path.clone());
        let before = store.get_item("anything");
        store.set_item("fresh", "1").unwrap();

        // Assert
        assert_eq!(before, None);
        assert_eq!(CoreKeyValueStore::open(path).get_item("fresh").as_deref(), Some("1"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join(STORAGE_FILENAME);
        let store = CoreKeyValueStore::open(path);

        let result = store.set_item("k", "v");

        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        // Arrange
        let dir = tempdir().unwrap();
        let store_dir = dir.path().join("store");
        fs::create_dir(&store_dir).unwrap();
        let store = CoreKeyValueStore::open(store_dir.join(STORAGE_FILENAME));
        store.set_item("kept", "1").unwrap();
        fs::remove_dir_all(&store_dir).unwrap();

        // Act
        let set_result = store.set_item("k", "v");
        let remove_result = store.remove_item("kept");

        // Assert
        assert!(set_result.is_err());
        assert!(remove_result.is_err());
        assert_eq!(store.get_item("k"), None);
        assert_eq!(store.get_item("kept"), Some("1".to_string()));

        fs::create_dir(&store_dir).unwrap();
        store.set_item("other", "2").unwrap();
        let reopened = CoreKeyValueStore::open(store_dir.join(STORAGE_FILENAME));
        assert_eq!(reopened.get_item("k"), None);
        assert_eq!(reopened.get_item("kept"), Some("1".to_string()));
    }
}
