//! The closed set of storable primitive types and the typed preference key.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A value a preference store can hold.
///
/// The variant set is closed: exactly the six primitives the store supports.
/// The serialized form tags each value with its variant so integers and
/// floats of different widths never collapse into one another on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Text(String),
}

impl PrefValue {
    /// The variant name, as used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            PrefValue::I32(_) => "i32",
            PrefValue::I64(_) => "i64",
            PrefValue::F32(_) => "f32",
            PrefValue::F64(_) => "f64",
            PrefValue::Bool(_) => "bool",
            PrefValue::Text(_) => "text",
        }
    }
}

/// A primitive type the preference store can hold directly.
///
/// Implemented for exactly `i32`, `i64`, `f32`, `f64`, `bool`, and `String`;
/// the conversion to and from [`PrefValue`] is resolved at compile time.
pub trait StorableValue: Sized {
    /// The [`PrefValue`] variant name for this type.
    fn kind() -> &'static str;

    /// Wrap this value in its [`PrefValue`] variant.
    fn into_value(self) -> PrefValue;

    /// Extract this type from a [`PrefValue`], or `None` if the value holds
    /// a different variant.
    fn from_value(value: &PrefValue) -> Option<Self>;
}

macro_rules! storable {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl StorableValue for $ty {
            fn kind() -> &'static str {
                $kind
            }

            fn into_value(self) -> PrefValue {
                PrefValue::$variant(self)
            }

            fn from_value(value: &PrefValue) -> Option<Self> {
                match value {
                    PrefValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

storable!(i32, I32, "i32");
storable!(i64, I64, "i64");
storable!(f32, F32, "f32");
storable!(f64, F64, "f64");
storable!(bool, Bool, "bool");
storable!(String, Text, "text");

/// A preference key bound to the type stored under it.
///
/// ```
/// use store::Key;
///
/// let theme: Key<String> = Key::new("uiTheme");
/// assert_eq!(theme.name(), "uiTheme");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key<T> {
    name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T: StorableValue> Key<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _value: PhantomData,
        }
    }
}

impl<T> Key<T> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
