//! The AEAD suites this build supports, and encrypt/decrypt over them.
//!
//! Every supported suite is authenticated: AES-256-GCM is the preferred
//! transformation, AES-256-GCM-SIV the fallback. The registry is compiled
//! in, so "querying platform capability" is a probe over this list.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm_siv::Aes256GcmSiv;
use thiserror::Error;

use crate::spec::TransformationSpec;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a GCM/GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Errors produced by the cryptographic layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The spec names a transformation this build has no suite for.
    #[error("unsupported transformation: {0}")]
    UnsupportedSpec(String),

    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The initialization vector is the wrong length for the suite.
    #[error("invalid initialization vector length: {0} bytes")]
    InvalidIvLength(usize),

    /// AEAD encryption or decryption failed (wrong key, tampered
    /// ciphertext, or authentication-tag mismatch).
    #[error("aead operation failed")]
    Aead,

    /// The secret-key store could not produce a key.
    #[error("key store failure: {0}")]
    KeyStore(String),
}

enum Suite {
    Gcm,
    GcmSiv,
}

/// Specs this build can encrypt and decrypt, in preference order.
pub fn supported_specs() -> Vec<TransformationSpec> {
    vec![
        TransformationSpec::new("AES", "GCM", "NoPadding"),
        TransformationSpec::new("AES", "GCM_SIV", "NoPadding"),
    ]
}

/// The first registry entry; the list is compiled in, so it is never empty.
pub fn preferred_spec() -> TransformationSpec {
    supported_specs().swap_remove(0)
}

/// Whether a suite exists for `spec`.
pub fn is_supported(spec: &TransformationSpec) -> bool {
    suite_for(spec).is_some()
}

/// Spec fields match case-insensitively; stored spec strings may predate a
/// casing change in the registry.
fn suite_for(spec: &TransformationSpec) -> Option<Suite> {
    if !spec.algorithm.eq_ignore_ascii_case("AES") || !spec.padding.eq_ignore_ascii_case("NoPadding")
    {
        return None;
    }
    if spec.block_mode.eq_ignore_ascii_case("GCM") {
        Some(Suite::Gcm)
    } else if spec.block_mode.eq_ignore_ascii_case("GCM_SIV") {
        Some(Suite::GcmSiv)
    } else {
        None
    }
}

/// Encrypt `plaintext` under the suite named by `spec`.
///
/// A fresh random 96-bit nonce is drawn per call via the OS CSPRNG and
/// returned alongside the ciphertext.
///
/// # Errors
///
/// Returns [`CryptoError::UnsupportedSpec`] if no suite matches,
/// [`CryptoError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes, and
/// [`CryptoError::Aead`] on an internal AEAD error.
pub fn encrypt(
    spec: &TransformationSpec,
    key: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let suite = suite_for(spec).ok_or_else(|| CryptoError::UnsupportedSpec(spec.to_string()))?;

    // Use OsRng for a cryptographically secure random nonce.
    use aes_gcm::aead::rand_core::RngCore;
    let mut iv = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let ciphertext = match suite {
        Suite::Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKeyLength)?
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Aead)?,
        Suite::GcmSiv => Aes256GcmSiv::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKeyLength)?
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Aead)?,
    };

    Ok((iv.to_vec(), ciphertext))
}

/// Decrypt `ciphertext` under the suite named by `spec`.
///
/// # Errors
///
/// Returns [`CryptoError::Aead`] if authentication fails — wrong key,
/// tampered ciphertext, or a mismatched tag.
pub fn decrypt(
    spec: &TransformationSpec,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let suite = suite_for(spec).ok_or_else(|| CryptoError::UnsupportedSpec(spec.to_string()))?;
    if iv.len() != NONCE_LEN {
        return Err(CryptoError::InvalidIvLength(iv.len()));
    }
    let nonce = Nonce::from_slice(iv);

    match suite {
        Suite::Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKeyLength)?
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Aead),
        Suite::GcmSiv => Aes256GcmSiv::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKeyLength)?
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Aead),
    }
}
