//! The flat preference map with typed access.

use std::collections::BTreeMap;

use convert::ValueConverter;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::value::{Key, PrefValue, StorableValue};

/// A flat map of preference name to stored value.
///
/// Values are accessed through typed [`Key`]s; a stored value of the wrong
/// variant reads as [`StoreError::TypeMismatch`], never as a coercion.
/// `Preferences` is a plain value — stores hand out immutable snapshots and
/// take a whole replacement state on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] when the stored value is a
    /// different variant than the key declares.
    pub fn get<T: StorableValue>(&self, key: &Key<T>) -> Result<Option<T>, StoreError> {
        let Some(value) = self.values.get(key.name()) else {
            return Ok(None);
        };

        T::from_value(value)
            .map(Some)
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.name().to_owned(),
                expected: T::kind(),
                actual: value.kind(),
            })
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn insert<T: StorableValue>(&mut self, key: &Key<T>, value: T) {
        self.values.insert(key.name().to_owned(), value.into_value());
    }

    /// Remove the value stored under `key`. Returns whether one was present.
    pub fn remove<T>(&mut self, key: &Key<T>) -> bool {
        self.values.remove(key.name()).is_some()
    }

    /// Whether a value is stored under `key` (of any variant).
    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.values.contains_key(key.name())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value stored under `key`, run back through `converter`, or
    /// `default` when the key is absent or the converter yields no value.
    pub fn get_or_default<C, O, S>(
        &self,
        key: &Key<S>,
        default: O,
        converter: &C,
    ) -> Result<O, StoreError>
    where
        S: StorableValue,
        C: ValueConverter<Original = Option<O>, Stored = Option<S>>,
    {
        match self.get(key)? {
            Some(stored) => Ok(converter.to_original(Some(stored))?.unwrap_or(default)),
            None => Ok(default),
        }
    }
}
