//! The versioned binary envelope carrying IV + spec + ciphertext.
//!
//! This codec has no knowledge of cipher semantics; it only relocates bytes
//! and spec metadata. The envelope is the one bit-exact stored contract in
//! this workspace and must stay backward compatible with previously stored
//! values.

use std::str;
use std::sync::Arc;

use thiserror::Error;

use crate::spec::{SpecParseError, TransformationSpec, TransformationSpecProvider};

/// Envelope format version written by [`MessageWrapper::wrap`].
pub const VERSION: u8 = 1;

/// Header bytes: one version byte plus two little-endian `u32` length fields.
pub const HEADER_LEN: usize = 9;

/// Errors produced while building or parsing an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The version byte names a format this build does not understand.
    #[error("unable to unwrap message, unsupported version {0}")]
    UnsupportedVersion(u8),

    /// A declared length points past the end of the buffer.
    #[error("envelope truncated: header declares {declared} bytes but only {actual} are present")]
    Truncated { declared: u64, actual: usize },

    /// A section is too large for its `u32` length field.
    #[error("envelope section of {0} bytes does not fit a u32 length field")]
    Oversize(usize),

    /// The spec segment is not valid UTF-8.
    #[error("envelope spec segment is not valid UTF-8")]
    SpecUtf8,

    /// The spec segment did not parse as a transformation.
    #[error(transparent)]
    Spec(#[from] SpecParseError),
}

/// Parsed view of an envelope.
///
/// Borrows the envelope buffer; the ciphertext is never copied.
#[derive(Debug)]
pub struct WrappedMessage<'a> {
    /// The initialization vector recorded at encryption time.
    pub initialization_vector: &'a [u8],
    /// The transformation recorded at encryption time.
    pub spec: TransformationSpec,
    /// Offset of the ciphertext within the envelope buffer.
    pub message_offset: usize,
    envelope: &'a [u8],
}

impl<'a> WrappedMessage<'a> {
    /// The ciphertext region: everything from [`Self::message_offset`] to the
    /// end of the envelope.
    pub fn ciphertext(&self) -> &'a [u8] {
        &self.envelope[self.message_offset..]
    }

    /// The full envelope buffer this view was parsed from.
    pub fn envelope(&self) -> &'a [u8] {
        self.envelope
    }
}

/// Builds and parses envelopes.
pub struct MessageWrapper {
    spec_provider: Arc<TransformationSpecProvider>,
}

impl MessageWrapper {
    pub fn new(spec_provider: Arc<TransformationSpecProvider>) -> Self {
        Self { spec_provider }
    }

    /// Wrap `ciphertext` together with the `iv` and `spec` used to produce
    /// it, so decryption can later recover exactly those parameters even if
    /// the preferred parameters have since changed.
    ///
    /// Layout (one exact-size allocation):
    ///
    /// ```text
    /// [version: u8 = 1][iv len: u32 LE][spec len: u32 LE][iv][spec utf-8][ciphertext]
    /// ```
    pub fn wrap(
        &self,
        iv: &[u8],
        spec: &TransformationSpec,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, EnvelopeError> {
        let transformation = spec.to_string();
        let iv_len = u32::try_from(iv.len()).map_err(|_| EnvelopeError::Oversize(iv.len()))?;
        let spec_len = u32::try_from(transformation.len())
            .map_err(|_| EnvelopeError::Oversize(transformation.len()))?;

        let mut envelope =
            Vec::with_capacity(HEADER_LEN + iv.len() + transformation.len() + ciphertext.len());
        envelope.push(VERSION);
        envelope.extend_from_slice(&iv_len.to_le_bytes());
        envelope.extend_from_slice(&spec_len.to_le_bytes());
        envelope.extend_from_slice(iv);
        envelope.extend_from_slice(transformation.as_bytes());
        envelope.extend_from_slice(ciphertext);
        Ok(envelope)
    }

    /// Parse an envelope back into its parts.
    ///
    /// Only version 1 is understood; any other version byte is a format
    /// error (future versions are an extension point, not yet implemented).
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Truncated`] when the buffer is shorter than
    /// the header or a declared length points past the end — declared
    /// lengths are validated before any slicing.
    pub fn unwrap<'a>(&self, envelope: &'a [u8]) -> Result<WrappedMessage<'a>, EnvelopeError> {
        if envelope.len() < HEADER_LEN {
            return Err(EnvelopeError::Truncated {
                declared: HEADER_LEN as u64,
                actual: envelope.len(),
            });
        }

        let version = envelope[0];
        if version != VERSION {
            return Err(EnvelopeError::UnsupportedVersion(version));
        }

        self.unwrap_v1(envelope)
    }

    fn unwrap_v1<'a>(&self, envelope: &'a [u8]) -> Result<WrappedMessage<'a>, EnvelopeError> {
        let iv_len = read_u32_le(envelope, 1) as usize;
        let spec_len = read_u32_le(envelope, 5) as usize;

        let declared = HEADER_LEN as u64 + iv_len as u64 + spec_len as u64;
        if declared > envelope.len() as u64 {
            return Err(EnvelopeError::Truncated {
                declared,
                actual: envelope.len(),
            });
        }

        let iv = &envelope[HEADER_LEN..HEADER_LEN + iv_len];
        let spec_start = HEADER_LEN + iv_len;
        let transformation = str::from_utf8(&envelope[spec_start..spec_start + spec_len])
            .map_err(|_| EnvelopeError::SpecUtf8)?;
        let spec = self.spec_provider.decode_spec(transformation)?;

        Ok(WrappedMessage {
            initialization_vector: iv,
            spec,
            message_offset: spec_start + spec_len,
            envelope,
        })
    }
}

fn read_u32_le(bytes: &[u8], start: usize) -> u32 {
    let mut field = [0u8; 4];
    field.copy_from_slice(&bytes[start..start + 4]);
    u32::from_le_bytes(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper() -> MessageWrapper {
        MessageWrapper::new(Arc::new(TransformationSpecProvider::new()))
    }

    fn gcm_spec() -> TransformationSpec {
        TransformationSpec::new("AES", "GCM", "NoPadding")
    }

    #[test]
    fn round_trip() {
        let wrapper = wrapper();
        let iv = [7u8; 12];
        let ciphertext = b"not really encrypted";

        let envelope = wrapper.wrap(&iv, &gcm_spec(), ciphertext).unwrap();
        let message = wrapper.unwrap(&envelope).unwrap();

        assert_eq!(message.initialization_vector, &iv);
        assert_eq!(message.spec, gcm_spec());
        assert_eq!(message.ciphertext(), ciphertext);
        assert_eq!(
            message.message_offset,
            HEADER_LEN + iv.len() + gcm_spec().to_string().len()
        );
    }

    #[test]
    fn layout_is_bit_exact() {
        let wrapper = wrapper();
        let envelope = wrapper.wrap(&[0xAA, 0xBB], &gcm_spec(), &[0xCC]).unwrap();

        let transformation = gcm_spec().to_string();
        assert_eq!(envelope[0], 1);
        assert_eq!(&envelope[1..5], &2u32.to_le_bytes());
        assert_eq!(&envelope[5..9], &(transformation.len() as u32).to_le_bytes());
        assert_eq!(&envelope[9..11], &[0xAA, 0xBB]);
        assert_eq!(&envelope[11..11 + transformation.len()], transformation.as_bytes());
        assert_eq!(envelope[envelope.len() - 1], 0xCC);
        assert_eq!(
            envelope.len(),
            HEADER_LEN + 2 + transformation.len() + 1
        );
    }

    #[test]
    fn empty_ciphertext_is_valid() {
        let wrapper = wrapper();
        let envelope = wrapper.wrap(&[1u8; 12], &gcm_spec(), &[]).unwrap();
        let message = wrapper.unwrap(&envelope).unwrap();
        assert!(message.ciphertext().is_empty());
    }

    #[test]
    fn rejects_unsupported_version() {
        let wrapper = wrapper();
        let mut envelope = wrapper.wrap(&[1u8; 12], &gcm_spec(), b"x").unwrap();
        envelope[0] = 2;
        assert!(matches!(
            wrapper.unwrap(&envelope),
            Err(EnvelopeError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_buffer_shorter_than_header() {
        let wrapper = wrapper();
        assert!(matches!(
            wrapper.unwrap(&[1, 0, 0]),
            Err(EnvelopeError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_iv_length_past_buffer() {
        let wrapper = wrapper();
        let mut envelope = wrapper.wrap(&[1u8; 12], &gcm_spec(), b"x").unwrap();
        // Declare an IV far larger than the buffer.
        envelope[1..5].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            wrapper.unwrap(&envelope),
            Err(EnvelopeError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_spec_length_past_buffer() {
        let wrapper = wrapper();
        let mut envelope = wrapper.wrap(&[1u8; 12], &gcm_spec(), b"x").unwrap();
        envelope[5..9].copy_from_slice(&10_000u32.to_le_bytes());
        assert!(matches!(
            wrapper.unwrap(&envelope),
            Err(EnvelopeError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_malformed_spec_segment() {
        let wrapper = wrapper();
        // Spec segment with the wrong number of slashes.
        let mut envelope = vec![1u8];
        envelope.extend_from_slice(&0u32.to_le_bytes());
        envelope.extend_from_slice(&3u32.to_le_bytes());
        envelope.extend_from_slice(b"AES");
        assert!(matches!(
            wrapper.unwrap(&envelope),
            Err(EnvelopeError::Spec(_))
        ));
    }

    #[test]
    fn rejects_non_utf8_spec_segment() {
        let wrapper = wrapper();
        let mut envelope = vec![1u8];
        envelope.extend_from_slice(&0u32.to_le_bytes());
        envelope.extend_from_slice(&2u32.to_le_bytes());
        envelope.extend_from_slice(&[0xFF, 0xFE]);
        assert!(matches!(
            wrapper.unwrap(&envelope),
            Err(EnvelopeError::SpecUtf8)
        ));
    }
}
