use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::warn;

use super::backend::{KeyValueBackend, Origin, StorageError, WriteOptions};

/// Origin-agnostic key/value storage, optionally mirrored to a JSON file.
///
/// Write options are ignored: entries never expire and have no domain.
#[derive(Debug, Default)]
pub struct LocalStorage {
    entries: RwLock<BTreeMap<String, String>>,
    path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads entries from `path` if it exists; every write rewrites the file.
    ///
    /// A file that is not a JSON string map is ignored and overwritten on the
    /// next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "discarding unreadable local storage file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(StorageError::Io(err)),
        };
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(entries)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl KeyValueBackend for LocalStorage {
    fn get(&self, _origin: &Origin, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries().get(key).cloned())
    }

    fn set(
        &self,
        _origin: &Origin,
        key: &str,
        value: Option<&str>,
        _options: &WriteOptions,
    ) -> Result<(), StorageError> {
        let mut entries = self.write_entries();
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(key);
            }
        }
        self.persist(&entries)
    }
}
