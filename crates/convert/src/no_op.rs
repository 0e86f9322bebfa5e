//! Pass-through converter.

use std::marker::PhantomData;

use crate::converter::ValueConverter;
use crate::error::ConvertError;

/// A converter that performs no conversion at all.
///
/// Used as the default when a typed binding stores a value that is already a
/// storable primitive.
pub struct NoOpValueConverter<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> NoOpValueConverter<T> {
    pub fn new() -> Self {
        Self { _value: PhantomData }
    }
}

impl<T> Default for NoOpValueConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueConverter for NoOpValueConverter<T> {
    type Original = T;
    type Stored = T;

    fn to_stored(&self, value: T) -> Result<T, ConvertError> {
        Ok(value)
    }

    fn to_original(&self, value: T) -> Result<T, ConvertError> {
        Ok(value)
    }
}
