//! The [`ValueConverter`] contract.

use std::fmt;

use crate::chain::Chained;
use crate::error::ConvertError;
use crate::non_null::NonNullValueConverter;

/// A bidirectional mapping between an application-level value type and the
/// type actually persisted.
///
/// Implementations hold configuration only — no per-call mutable state — so a
/// single converter may be shared across concurrent callers.
///
/// The round-trip law: for every value `x` the converter declares itself
/// capable of encoding, `to_original(to_stored(x)) == x`. Converters are not
/// required to be surjective onto `Stored`.
pub trait ValueConverter {
    /// The application-side value type.
    type Original;
    /// The storage-side value type.
    type Stored;

    /// Convert an application value into its stored form.
    fn to_stored(&self, value: Self::Original) -> Result<Self::Stored, ConvertError>;

    /// Convert a stored value back into its application form.
    fn to_original(&self, value: Self::Stored) -> Result<Self::Original, ConvertError>;

    /// Chain this converter with `next`.
    ///
    /// When storing, `self` runs before `next`; when reading, the order is
    /// reversed. See [`Chained`].
    ///
    /// ```
    /// use convert::{Base64ValueConverter, Utf8BytesValueConverter, ValueConverter};
    ///
    /// let chained = Utf8BytesValueConverter::new().then(Base64ValueConverter::new());
    /// let stored = chained.to_stored(Some("token".into())).unwrap();
    /// assert_eq!(chained.to_original(stored).unwrap(), Some("token".to_owned()));
    /// ```
    fn then<N>(self, next: N) -> Chained<Self, N>
    where
        Self: Sized,
        N: ValueConverter<Original = Self::Stored>,
    {
        Chained::new(self, next)
    }

    /// Wrap a converter over optional values into one over required values,
    /// using the default absence policy (fail with
    /// [`ConvertError::RequiredAbsent`]). See [`NonNullValueConverter`].
    fn non_null<O, S>(self) -> NonNullValueConverter<Self, O, S>
    where
        Self: Sized + ValueConverter<Original = Option<O>, Stored = Option<S>>,
        O: fmt::Debug,
        S: fmt::Debug,
    {
        NonNullValueConverter::new(self)
    }
}
