//! Authenticated encryption for stored preference values.
//!
//! The [`EncryptedValueConverter`] is the only place the generic conversion
//! pipeline couples to cryptographic semantics. Beneath it sit three
//! algorithm-agnostic pieces: the [`TransformationSpecProvider`] that selects
//! the currently preferred cipher parameters, the [`MessageWrapper`] envelope
//! codec, and the [`SecretKeyStore`] contract for get-or-create key access.
//! Actual cipher work is delegated to a [`ValueEncryptor`].
//!
//! # Envelope format
//!
//! ```text
//! [version: u8 = 1][iv len: u32 LE][spec len: u32 LE][iv][spec utf-8][ciphertext]
//! ```
//!
//! The spec segment records the algorithm/block-mode/padding triple used at
//! encryption time, so a stored value decrypts with exactly those parameters
//! even after an upgrade moves the preferred transformation.

pub mod cipher;
pub mod encrypted;
pub mod encryptor;
pub mod envelope;
pub mod key;
pub mod spec;

pub use cipher::CryptoError;
pub use encrypted::EncryptedValueConverter;
pub use encryptor::{DefaultValueEncryptor, EncryptedPayload, ValueEncryptor};
pub use envelope::{EnvelopeError, MessageWrapper, WrappedMessage};
pub use key::{InMemoryKeyStore, KeyMaterial, SecretKeyStore};
pub use spec::{SpecParseError, TransformationSpec, TransformationSpecProvider};
