//! Null-safety adapter over converters with optional stages.

use std::fmt;

use crate::converter::ValueConverter;
use crate::error::ConvertError;

type AbsenceHandler<In, Out> = Box<dyn Fn(In) -> Result<Out, ConvertError> + Send + Sync>;

/// Wraps a `Converter<Option<O>, Option<S>>` into a `Converter<O, S>`.
///
/// The inner converter's stages may legitimately produce an absent value
/// (e.g. the encrypting converter passes `None` through untouched). When a
/// value is required, an unexpected `None` from the inner converter is never
/// ignored: it is routed to the configured absence handler, which must either
/// produce a value or return an error. The default handlers fail with
/// [`ConvertError::RequiredAbsent`] carrying a rendering of the offending
/// input — silently substituting data in a persisted-preferences context is
/// worse than failing loudly.
///
/// Usually built via [`ValueConverter::non_null`].
pub struct NonNullValueConverter<C, O, S> {
    inner: C,
    on_absent_stored: AbsenceHandler<O, S>,
    on_absent_original: AbsenceHandler<S, O>,
}

impl<C, O, S> NonNullValueConverter<C, O, S>
where
    C: ValueConverter<Original = Option<O>, Stored = Option<S>>,
{
    /// Wrap `inner` with the default absence policy: fail with
    /// [`ConvertError::RequiredAbsent`].
    pub fn new(inner: C) -> Self
    where
        O: fmt::Debug,
        S: fmt::Debug,
    {
        Self::with_handlers(
            inner,
            |value: O| Err(ConvertError::RequiredAbsent(format!("{value:?}"))),
            |value: S| Err(ConvertError::RequiredAbsent(format!("{value:?}"))),
        )
    }

    /// Wrap `inner` with custom absence handlers.
    ///
    /// `on_absent_stored` runs when storing produced no value and receives the
    /// original input; `on_absent_original` is its mirror for reads.
    pub fn with_handlers(
        inner: C,
        on_absent_stored: impl Fn(O) -> Result<S, ConvertError> + Send + Sync + 'static,
        on_absent_original: impl Fn(S) -> Result<O, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            on_absent_stored: Box::new(on_absent_stored),
            on_absent_original: Box::new(on_absent_original),
        }
    }
}

impl<C, O, S> ValueConverter for NonNullValueConverter<C, O, S>
where
    C: ValueConverter<Original = Option<O>, Stored = Option<S>>,
    O: Clone,
    S: Clone,
{
    type Original = O;
    type Stored = S;

    fn to_stored(&self, value: O) -> Result<S, ConvertError> {
        // Keep a copy for the handler; the inner converter consumes the value.
        let kept = value.clone();
        match self.inner.to_stored(Some(value))? {
            Some(stored) => Ok(stored),
            None => (self.on_absent_stored)(kept),
        }
    }

    fn to_original(&self, value: S) -> Result<O, ConvertError> {
        let kept = value.clone();
        match self.inner.to_original(Some(value))? {
            Some(original) => Ok(original),
            None => (self.on_absent_original)(kept),
        }
    }
}
