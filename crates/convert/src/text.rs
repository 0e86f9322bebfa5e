//! UTF-8 string ↔ byte conversion.

use crate::converter::ValueConverter;
use crate::error::ConvertError;

/// Converts a string to its UTF-8 bytes.
///
/// Useful ahead of converters that operate on bytes, such as the encrypting
/// converter.
pub struct Utf8BytesValueConverter;

impl Utf8BytesValueConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Utf8BytesValueConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueConverter for Utf8BytesValueConverter {
    type Original = Option<String>;
    type Stored = Option<Vec<u8>>;

    fn to_stored(&self, value: Option<String>) -> Result<Option<Vec<u8>>, ConvertError> {
        Ok(value.map(String::into_bytes))
    }

    fn to_original(&self, value: Option<Vec<u8>>) -> Result<Option<String>, ConvertError> {
        value
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map_err(|e| ConvertError::Format(format!("stored bytes are not valid UTF-8: {e}")))
            })
            .transpose()
    }
}
