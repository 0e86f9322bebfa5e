//! The encryption collaborator contract and its default implementation.

use std::sync::Arc;

use crate::cipher::{self, CryptoError};
use crate::key::SecretKeyStore;
use crate::spec::TransformationSpec;

/// Ciphertext plus the initialization vector actually used to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub initialization_vector: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Performs symmetric encrypt/decrypt and key management.
///
/// Implementations must draw a fresh, unpredictable IV per encryption call
/// and provide authenticated encryption semantics where the spec supports
/// it. The encrypting converter drives this contract; mocking it isolates
/// converter behaviour from real cryptography in tests.
#[cfg_attr(test, mockall::automock)]
pub trait ValueEncryptor: Send + Sync {
    /// Pick or derive the key for `(alias, spec)` and encrypt `plaintext`.
    fn encrypt(
        &self,
        alias: &str,
        spec: &TransformationSpec,
        plaintext: &[u8],
    ) -> Result<EncryptedPayload, CryptoError>;

    /// Decrypt `ciphertext` with the key for `(alias, spec)` and `iv`.
    fn decrypt(
        &self,
        alias: &str,
        spec: &TransformationSpec,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}

/// [`ValueEncryptor`] over a [`SecretKeyStore`] and the built-in cipher
/// registry.
pub struct DefaultValueEncryptor {
    key_store: Arc<dyn SecretKeyStore>,
}

impl DefaultValueEncryptor {
    pub fn new(key_store: Arc<dyn SecretKeyStore>) -> Self {
        Self { key_store }
    }
}

impl ValueEncryptor for DefaultValueEncryptor {
    fn encrypt(
        &self,
        alias: &str,
        spec: &TransformationSpec,
        plaintext: &[u8],
    ) -> Result<EncryptedPayload, CryptoError> {
        let key = self.key_store.obtain(alias, spec)?;
        let (initialization_vector, ciphertext) = cipher::encrypt(spec, key.as_bytes(), plaintext)?;
        Ok(EncryptedPayload {
            initialization_vector,
            ciphertext,
        })
    }

    fn decrypt(
        &self,
        alias: &str,
        spec: &TransformationSpec,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let key = self.key_store.obtain(alias, spec)?;
        cipher::decrypt(spec, key.as_bytes(), iv, ciphertext)
    }
}
