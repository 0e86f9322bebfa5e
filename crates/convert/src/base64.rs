//! Bytes ↔ base64 text conversion.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::converter::ValueConverter;
use crate::error::ConvertError;

/// Converts raw bytes to a base64 string.
///
/// The usual final stage of an encrypting chain, turning the binary envelope
/// into a value a text-only preference store can hold.
pub struct Base64ValueConverter;

impl Base64ValueConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Base64ValueConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueConverter for Base64ValueConverter {
    type Original = Option<Vec<u8>>;
    type Stored = Option<String>;

    fn to_stored(&self, value: Option<Vec<u8>>) -> Result<Option<String>, ConvertError> {
        Ok(value.map(|bytes| STANDARD.encode(bytes)))
    }

    fn to_original(&self, value: Option<String>) -> Result<Option<Vec<u8>>, ConvertError> {
        value
            .map(|text| {
                STANDARD
                    .decode(text)
                    .map_err(|e| ConvertError::Format(format!("invalid base64: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_vector() {
        let converter = Base64ValueConverter::new();
        let stored = converter.to_stored(Some(b"hi".to_vec())).unwrap();
        assert_eq!(stored, Some("aGk=".to_owned()));
    }

    #[test]
    fn round_trip() {
        let converter = Base64ValueConverter::new();
        let bytes = vec![0u8, 1, 2, 254, 255];
        let stored = converter.to_stored(Some(bytes.clone())).unwrap();
        assert_eq!(converter.to_original(stored).unwrap(), Some(bytes));
    }

    #[test]
    fn absent_passes_through() {
        let converter = Base64ValueConverter::new();
        assert_eq!(converter.to_stored(None).unwrap(), None);
        assert_eq!(converter.to_original(None).unwrap(), None);
    }

    #[test]
    fn invalid_base64_is_a_format_error() {
        let converter = Base64ValueConverter::new();
        let err = converter.to_original(Some("!!!".into())).unwrap_err();
        assert!(matches!(err, ConvertError::Format(_)));
    }
}
