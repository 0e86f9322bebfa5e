//! Converts between an enum variant and its canonical name string.

use std::marker::PhantomData;

use strum::IntoEnumIterator;
use tracing::warn;

use crate::converter::ValueConverter;
use crate::error::ConvertError;

type UnknownNameHandler<E> = Box<dyn Fn(&str, &str) -> Result<E, ConvertError> + Send + Sync>;

/// Converts between an enum variant and the name string stored for it.
///
/// The enum must derive `strum_macros::EnumIter` and `strum_macros::AsRefStr`,
/// which together form the closed variant/name registry this converter scans.
/// Decoding matches names case-insensitively (ASCII); on no match the
/// unknown-name handler is invoked with the raw name and the enum's display
/// name. Stored names may predate a rename of the corresponding variant —
/// deployments that want forward compatibility supply a remapping handler
/// instead of the default, which fails with [`ConvertError::UnknownName`].
pub struct EnumValueConverter<E> {
    on_unknown_name: UnknownNameHandler<E>,
    _variant: PhantomData<fn() -> E>,
}

impl<E> EnumValueConverter<E>
where
    E: IntoEnumIterator + AsRef<str>,
{
    /// Build a converter with the default unknown-name policy: fail with
    /// [`ConvertError::UnknownName`].
    pub fn new() -> Self {
        Self::with_unknown_name_handler(|name, enum_name| {
            Err(ConvertError::UnknownName {
                name: name.to_owned(),
                enum_name: enum_name.to_owned(),
            })
        })
    }

    /// Build a converter with a custom unknown-name handler.
    ///
    /// The handler receives the stored name that failed to match and the
    /// enum's display name, and must return a substitute variant or an error.
    pub fn with_unknown_name_handler(
        handler: impl Fn(&str, &str) -> Result<E, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_unknown_name: Box::new(handler),
            _variant: PhantomData,
        }
    }
}

impl<E> Default for EnumValueConverter<E>
where
    E: IntoEnumIterator + AsRef<str>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ValueConverter for EnumValueConverter<E>
where
    E: IntoEnumIterator + AsRef<str>,
{
    type Original = Option<E>;
    type Stored = Option<String>;

    fn to_stored(&self, value: Option<E>) -> Result<Option<String>, ConvertError> {
        Ok(value.map(|variant| variant.as_ref().to_owned()))
    }

    fn to_original(&self, value: Option<String>) -> Result<Option<E>, ConvertError> {
        let Some(name) = value else {
            return Ok(None);
        };

        match E::iter().find(|variant| variant.as_ref().eq_ignore_ascii_case(&name)) {
            Some(variant) => Ok(Some(variant)),
            None => {
                let enum_name = enum_display_name::<E>();
                warn!(name = %name, enum_name, "stored name does not match any variant");
                (self.on_unknown_name)(&name, enum_name).map(Some)
            }
        }
    }
}

/// The bare type name, without its module path.
fn enum_display_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}
