//! The data store contract and the converter-aware access helpers.

use std::sync::Arc;

use convert::{ConvertError, ValueConverter};
use thiserror::Error;

use crate::prefs::Preferences;
use crate::value::{Key, StorableValue};

/// Errors surfaced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be parsed.
    #[error("stored document is corrupt: {0}")]
    Corrupt(String),

    /// A stored value holds a different variant than the key declares.
    #[error("preference \"{key}\" holds a {actual} value, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A converter stage failed while shaping a value.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Atomic access to a whole preference state.
///
/// `read` returns a consistent snapshot of the current state; `update` is an
/// atomic read-modify-write of the entire state — the closure receives the
/// current preferences and returns the replacement, and no other update
/// interleaves between the read and the publish.
pub trait DataStore: Send + Sync {
    /// A snapshot of the current state.
    fn read(&self) -> Result<Arc<Preferences>, StoreError>;

    /// Atomically replace the state with `apply(current)`.
    ///
    /// Returns the newly published state.
    fn update<F>(&self, apply: F) -> Result<Arc<Preferences>, StoreError>
    where
        F: FnOnce(Preferences) -> Preferences;
}

/// Read the value under `key` from `store`, run it back through `converter`,
/// falling back to `default` when no value is stored.
pub fn read_value<D, C, O, S>(
    store: &D,
    key: &Key<S>,
    default: O,
    converter: &C,
) -> Result<O, StoreError>
where
    D: DataStore,
    S: StorableValue,
    C: ValueConverter<Original = Option<O>, Stored = Option<S>>,
{
    store.read()?.get_or_default(key, default, converter)
}

/// Run `value` through `converter` and store the result under `key`.
///
/// A converter that yields no stored value (e.g. a chain whose stages pass
/// absence through) removes the key instead of writing anything.
pub fn write_value<D, C, O, S>(
    store: &D,
    key: &Key<S>,
    value: O,
    converter: &C,
) -> Result<(), StoreError>
where
    D: DataStore,
    S: StorableValue,
    C: ValueConverter<Original = Option<O>, Stored = Option<S>>,
{
    let stored = converter.to_stored(Some(value))?;
    store.update(|mut prefs| {
        match stored {
            Some(converted) => prefs.insert(key, converted),
            None => {
                prefs.remove(key);
            }
        }
        prefs
    })?;
    Ok(())
}
