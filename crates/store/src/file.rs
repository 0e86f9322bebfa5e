//! JSON file-backed data store with atomic writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::prefs::Preferences;
use crate::store::{DataStore, StoreError};

/// [`DataStore`] persisting the preference state as a single JSON document.
///
/// The file is loaded lazily on first access and cached; a missing file
/// reads as empty preferences. Updates write the whole document to a
/// temporary file and rename it over the target, so a crash mid-write never
/// leaves a half-written document behind.
pub struct FileDataStore {
    path: PathBuf,
    current: Mutex<Option<Arc<Preferences>>>,
}

impl FileDataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Arc<Preferences>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let prefs: Preferences = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                debug!(path = %self.path.display(), entries = prefs.len(), "loaded preferences");
                Ok(Arc::new(prefs))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Arc::new(Preferences::new())),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file, then rename over the target.
    fn persist(&self, prefs: &Preferences) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json =
            serde_json::to_string_pretty(prefs).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DataStore for FileDataStore {
    fn read(&self) -> Result<Arc<Preferences>, StoreError> {
        let mut cache = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prefs) = cache.as_ref() {
            return Ok(Arc::clone(prefs));
        }

        let loaded = self.load()?;
        *cache = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    fn update<F>(&self, apply: F) -> Result<Arc<Preferences>, StoreError>
    where
        F: FnOnce(Preferences) -> Preferences,
    {
        // The cache is only replaced after a successful persist, so a failed
        // or panicked update leaves both the file and the cache unchanged.
        let mut cache = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let current = match cache.as_ref() {
            Some(prefs) => Arc::clone(prefs),
            None => self.load()?,
        };

        let next = Arc::new(apply(Preferences::clone(&current)));
        self.persist(&next)?;
        *cache = Some(Arc::clone(&next));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Key;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileDataStore {
        FileDataStore::new(dir.path().join("prefs.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn values_survive_reopening() {
        let dir = TempDir::new().unwrap();
        let key: Key<String> = Key::new("label");

        let store = store_in(&dir);
        store
            .update(|mut prefs| {
                prefs.insert(&key, "persisted".to_owned());
                prefs
            })
            .unwrap();
        drop(store);

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.read().unwrap().get(&key).unwrap(),
            Some("persisted".to_owned())
        );
    }

    #[test]
    fn update_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .update(|mut prefs| {
                prefs.insert(&Key::<bool>::new("enabled"), true);
                prefs
            })
            .unwrap();

        assert!(dir.path().join("prefs.json").exists());
        assert!(!dir.path().join("prefs.json.tmp").exists());
    }

    #[test]
    fn corrupt_document_is_a_typed_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("prefs.json"), "not json").unwrap();

        let store = store_in(&dir);
        assert!(matches!(store.read(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileDataStore::new(dir.path().join("nested").join("prefs.json"));
        store
            .update(|mut prefs| {
                prefs.insert(&Key::<i32>::new("count"), 1);
                prefs
            })
            .unwrap();
        assert!(dir.path().join("nested").join("prefs.json").exists());
    }

    #[test]
    fn successive_updates_accumulate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let count: Key<i32> = Key::new("count");
        let label: Key<String> = Key::new("label");

        store
            .update(|mut prefs| {
                prefs.insert(&count, 1);
                prefs
            })
            .unwrap();
        store
            .update(|mut prefs| {
                prefs.insert(&label, "two".to_owned());
                prefs
            })
            .unwrap();

        let prefs = store.read().unwrap();
        assert_eq!(prefs.get(&count).unwrap(), Some(1));
        assert_eq!(prefs.get(&label).unwrap(), Some("two".to_owned()));
    }
}
