//! Composition of two converters into one.

use crate::converter::ValueConverter;
use crate::error::ConvertError;

/// Composes a `Converter<A, B>` with a `Converter<B, C>` into a
/// `Converter<A, C>`.
///
/// The last stage applied when storing is the first undone when reading:
/// `to_stored` runs `first` then `second`, `to_original` runs `second` then
/// `first`. Neither stage knows anything about its neighbour beyond the
/// boundary type `B`. Usually built via
/// [`ValueConverter::then`](crate::ValueConverter::then).
pub struct Chained<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chained<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> ValueConverter for Chained<A, B>
where
    A: ValueConverter,
    B: ValueConverter<Original = A::Stored>,
{
    type Original = A::Original;
    type Stored = B::Stored;

    fn to_stored(&self, value: Self::Original) -> Result<Self::Stored, ConvertError> {
        self.second.to_stored(self.first.to_stored(value)?)
    }

    fn to_original(&self, value: Self::Stored) -> Result<Self::Original, ConvertError> {
        self.first.to_original(self.second.to_original(value)?)
    }
}
