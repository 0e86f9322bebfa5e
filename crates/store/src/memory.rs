//! In-memory data store with lock-free reads.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::prefs::Preferences;
use crate::store::{DataStore, StoreError};

/// [`DataStore`] holding the preference state in memory.
///
/// The current state lives in an [`ArcSwap`], so readers never block.
/// Updaters are serialized by a mutex: each one reads the current state,
/// applies its closure, and publishes the replacement before the next
/// updater may start, which makes `update` an atomic read-modify-write.
pub struct MemoryDataStore {
    current: ArcSwap<Preferences>,
    updates: Mutex<()>,
}

impl MemoryDataStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::with_initial(Preferences::new())
    }

    /// A store starting from `initial`.
    pub fn with_initial(initial: Preferences) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(initial)),
            updates: Mutex::new(()),
        }
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for MemoryDataStore {
    fn read(&self) -> Result<Arc<Preferences>, StoreError> {
        Ok(self.current.load_full())
    }

    fn update<F>(&self, apply: F) -> Result<Arc<Preferences>, StoreError>
    where
        F: FnOnce(Preferences) -> Preferences,
    {
        // A panicked updater never published its state, so the current value
        // is intact and the poisoned guard can be taken over.
        let _guard = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(apply(Preferences::clone(&self.current.load())));
        self.current.store(Arc::clone(&next));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Key;

    #[test]
    fn starts_empty() {
        let store = MemoryDataStore::new();
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn update_publishes_the_replacement_state() {
        let store = MemoryDataStore::new();
        let key: Key<i32> = Key::new("count");

        let published = store
            .update(|mut prefs| {
                prefs.insert(&key, 1);
                prefs
            })
            .unwrap();

        assert_eq!(published.get(&key).unwrap(), Some(1));
        assert_eq!(store.read().unwrap().get(&key).unwrap(), Some(1));
    }

    #[test]
    fn snapshots_are_unaffected_by_later_updates() {
        let store = MemoryDataStore::new();
        let key: Key<i32> = Key::new("count");

        let before = store.read().unwrap();
        store
            .update(|mut prefs| {
                prefs.insert(&key, 1);
                prefs
            })
            .unwrap();

        assert!(before.is_empty());
        assert_eq!(store.read().unwrap().get(&key).unwrap(), Some(1));
    }

    #[test]
    fn interleaved_updates_never_lose_increments() {
        let store = Arc::new(MemoryDataStore::new());
        let key: Key<i64> = Key::new("count");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = Arc::clone(&store);
                let key = key.clone();
                scope.spawn(move || {
                    for _ in 0..25 {
                        store
                            .update(|mut prefs| {
                                let current = prefs.get(&key).unwrap().unwrap_or(0);
                                prefs.insert(&key, current + 1);
                                prefs
                            })
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(store.read().unwrap().get(&key).unwrap(), Some(200));
    }
}
