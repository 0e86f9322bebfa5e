//! The error type shared by every converter stage.

use thiserror::Error;

/// Errors surfaced by [`ValueConverter`](crate::ValueConverter) implementations.
///
/// Every stage in a chain returns this same type so that composed converters
/// propagate failures unchanged to their caller. Variants map to the failure
/// points of the pipeline:
/// - [`ConvertError::Format`] — a stored value could not be parsed back
///   (bad base64, invalid UTF-8, malformed envelope).
/// - [`ConvertError::UnknownName`] — an enum decode found no matching variant
///   and no custom handler remapped it.
/// - [`ConvertError::RequiredAbsent`] — a null-safety adapter saw an
///   unexpected absent value.
/// - [`ConvertError::Crypto`] — the encryption collaborator failed to encrypt
///   or decrypt, including authentication failure.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The stored value is malformed and cannot be decoded.
    #[error("malformed stored value: {0}")]
    Format(String),

    /// No enum variant matches the stored name.
    #[error("no variant named \"{name}\" in {enum_name}")]
    UnknownName {
        /// The stored name that failed to match.
        name: String,
        /// Display name of the target enum.
        enum_name: String,
    },

    /// A converter whose stages may produce an absent value produced one
    /// where a value was required.
    #[error("required value was absent after converting {0}")]
    RequiredAbsent(String),

    /// Encryption or decryption failed.
    #[error("crypto operation failed: {0}")]
    Crypto(String),
}
