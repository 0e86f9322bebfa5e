//! Typed access to a flat key-value preference store.
//!
//! Preferences hold a closed set of storable primitives ([`PrefValue`]).
//! A [`Key`] carries the value type it was declared with, so reads and
//! writes are checked at compile time; a stored value of the wrong variant
//! surfaces as a typed error rather than a silent coercion.
//!
//! The [`DataStore`] contract offers an atomic read of the current state and
//! an atomic read-modify-write update of the whole state. Two reference
//! implementations ship here: [`MemoryDataStore`] and the JSON-backed
//! [`FileDataStore`]. The [`read_value`]/[`write_value`] helpers bind a key,
//! a default, and a converter chain from the `convert` crate to any store.

pub mod file;
pub mod memory;
pub mod prefs;
pub mod store;
pub mod value;

pub use file::FileDataStore;
pub use memory::MemoryDataStore;
pub use prefs::Preferences;
pub use store::{read_value, write_value, DataStore, StoreError};
pub use value::{Key, PrefValue, StorableValue};
