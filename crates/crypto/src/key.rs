//! Secret key material and the get-or-create key store contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::cipher::{CryptoError, KEY_LEN};
use crate::spec::TransformationSpec;

/// Fixed-size buffer holding exactly [`KEY_LEN`] bytes of key material.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct KeyMaterial(Box<[u8; KEY_LEN]>);

impl KeyMaterial {
    /// Generate fresh key material from the OS CSPRNG.
    pub fn generate() -> Self {
        use aes_gcm::aead::rand_core::RngCore;
        let mut buf = Box::new([0u8; KEY_LEN]);
        aes_gcm::aead::OsRng.fill_bytes(buf.as_mut_slice());
        Self(buf)
    }

    /// Wrap existing key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless `bytes` is exactly
    /// [`KEY_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength);
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Get-or-create access to the symmetric key for an `(alias, spec)` pair.
///
/// Implementations must guarantee that at most one key is ever created per
/// `(alias, spec)`: if concurrent first use created two keys, a value
/// encrypted under one could never be decrypted under the other. The
/// reference implementation holds a single lock across lookup-and-create;
/// any replacement must preserve the same guarantee.
pub trait SecretKeyStore: Send + Sync {
    /// Return the key for `(alias, spec)`, creating it if absent.
    fn obtain(&self, alias: &str, spec: &TransformationSpec)
        -> Result<KeyMaterial, CryptoError>;
}

/// Derive the storage alias for an `(alias, spec)` pair.
///
/// The key depends on the spec — distinct specs must map to distinct keys —
/// so a stable digest of the canonical spec string is appended to the
/// caller's alias.
pub fn storage_alias(alias: &str, spec: &TransformationSpec) -> String {
    let digest = Sha256::digest(spec.to_string().as_bytes());
    format!("{alias}-{}", URL_SAFE_NO_PAD.encode(&digest[..8]))
}

/// In-memory [`SecretKeyStore`].
///
/// Stands in for the platform keystore in tests and embeddings that manage
/// persistence themselves; keys do not survive the process.
pub struct InMemoryKeyStore {
    keys: Mutex<HashMap<String, KeyMaterial>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretKeyStore for InMemoryKeyStore {
    fn obtain(
        &self,
        alias: &str,
        spec: &TransformationSpec,
    ) -> Result<KeyMaterial, CryptoError> {
        let storage_alias = storage_alias(alias, spec);

        // One lock held across lookup-and-create: at most one key per
        // (alias, spec), even under concurrent first use.
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| CryptoError::KeyStore("key store lock poisoned".into()))?;

        if let Some(key) = keys.get(&storage_alias) {
            return Ok(key.clone());
        }

        let key = KeyMaterial::generate();
        info!(alias = %storage_alias, "created secret key");
        keys.insert(storage_alias, key.clone());
        Ok(key)
    }
}
