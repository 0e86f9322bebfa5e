//! The encrypting converter: the one place the pipeline meets cryptography.

use std::sync::Arc;

use convert::{ConvertError, ValueConverter};
use tracing::warn;

use crate::cipher::CryptoError;
use crate::encryptor::ValueEncryptor;
use crate::envelope::MessageWrapper;
use crate::spec::TransformationSpecProvider;

type CryptoErrorHandler =
    Box<dyn Fn(CryptoError, &[u8]) -> Result<Vec<u8>, ConvertError> + Send + Sync>;

/// Encrypts values when storing and decrypts them on retrieval.
///
/// Combine with other converters to shape application values into the bytes
/// this converter operates on. An absent value passes through untouched in
/// both directions — "no value stored yet" is not an error here.
///
/// Storing obtains the currently preferred transformation from the spec
/// provider, delegates encryption to the [`ValueEncryptor`], and wraps the
/// result in the envelope. Reading parses the envelope and decrypts with
/// exactly the spec and IV recorded in it, so previously stored values
/// survive a change of the preferred parameters. Crypto failures route to
/// pluggable handlers; both default to failing with
/// [`ConvertError::Crypto`].
///
/// Each call is independent: encrypting the same plaintext twice yields
/// different envelopes only because the encryptor draws a fresh IV per call.
pub struct EncryptedValueConverter {
    alias: String,
    encryptor: Arc<dyn ValueEncryptor>,
    spec_provider: Arc<TransformationSpecProvider>,
    wrapper: MessageWrapper,
    on_encrypt_error: CryptoErrorHandler,
    on_decrypt_error: CryptoErrorHandler,
}

impl EncryptedValueConverter {
    pub fn new(alias: impl Into<String>, encryptor: Arc<dyn ValueEncryptor>) -> Self {
        Self::with_spec_provider(alias, encryptor, Arc::new(TransformationSpecProvider::new()))
    }

    pub fn with_spec_provider(
        alias: impl Into<String>,
        encryptor: Arc<dyn ValueEncryptor>,
        spec_provider: Arc<TransformationSpecProvider>,
    ) -> Self {
        Self {
            alias: alias.into(),
            encryptor,
            wrapper: MessageWrapper::new(Arc::clone(&spec_provider)),
            spec_provider,
            on_encrypt_error: Box::new(|e, _| Err(ConvertError::Crypto(e.to_string()))),
            on_decrypt_error: Box::new(|e, _| Err(ConvertError::Crypto(e.to_string()))),
        }
    }

    /// Replace the handler invoked when encryption fails.
    ///
    /// The handler receives the failure and the plaintext that could not be
    /// encrypted, and must produce the bytes to store or an error.
    pub fn on_encryption_error(
        mut self,
        handler: impl Fn(CryptoError, &[u8]) -> Result<Vec<u8>, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        self.on_encrypt_error = Box::new(handler);
        self
    }

    /// Replace the handler invoked when decryption fails.
    ///
    /// The handler receives the failure and the stored envelope bytes, and
    /// must produce the plaintext to return or an error.
    pub fn on_decryption_error(
        mut self,
        handler: impl Fn(CryptoError, &[u8]) -> Result<Vec<u8>, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        self.on_decrypt_error = Box::new(handler);
        self
    }
}

impl ValueConverter for EncryptedValueConverter {
    type Original = Option<Vec<u8>>;
    type Stored = Option<Vec<u8>>;

    fn to_stored(&self, value: Option<Vec<u8>>) -> Result<Option<Vec<u8>>, ConvertError> {
        let Some(plaintext) = value else {
            return Ok(None);
        };

        let spec = self.spec_provider.supported_spec();
        let stored = match self.encryptor.encrypt(&self.alias, &spec, &plaintext) {
            Ok(payload) => self
                .wrapper
                .wrap(&payload.initialization_vector, &spec, &payload.ciphertext)
                .map_err(|e| ConvertError::Format(e.to_string()))?,
            Err(e) => {
                warn!(error = %e, "encryption failed");
                (self.on_encrypt_error)(e, &plaintext)?
            }
        };

        Ok(Some(stored))
    }

    fn to_original(&self, value: Option<Vec<u8>>) -> Result<Option<Vec<u8>>, ConvertError> {
        let Some(stored) = value else {
            return Ok(None);
        };

        let message = self
            .wrapper
            .unwrap(&stored)
            .map_err(|e| ConvertError::Format(e.to_string()))?;

        match self.encryptor.decrypt(
            &self.alias,
            &message.spec,
            message.initialization_vector,
            message.ciphertext(),
        ) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) => {
                warn!(error = %e, "decryption failed");
                (self.on_decrypt_error)(e, &stored).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryptor::{DefaultValueEncryptor, MockValueEncryptor};
    use crate::key::InMemoryKeyStore;
    use crate::spec::TransformationSpec;

    fn converter() -> EncryptedValueConverter {
        let key_store = Arc::new(InMemoryKeyStore::new());
        EncryptedValueConverter::new("prefs", Arc::new(DefaultValueEncryptor::new(key_store)))
    }

    #[test]
    fn absent_passes_through_both_ways() {
        let converter = converter();
        assert_eq!(converter.to_stored(None).unwrap(), None);
        assert_eq!(converter.to_original(None).unwrap(), None);
    }

    #[test]
    fn round_trip() {
        let converter = converter();
        let stored = converter.to_stored(Some(b"hello".to_vec())).unwrap();
        assert_eq!(
            converter.to_original(stored).unwrap(),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn encryption_is_nondeterministic_decryption_is_not() {
        let converter = converter();
        let first = converter.to_stored(Some(b"hello".to_vec())).unwrap();
        let second = converter.to_stored(Some(b"hello".to_vec())).unwrap();
        assert_ne!(first, second);
        assert_eq!(converter.to_original(first).unwrap(), Some(b"hello".to_vec()));
        assert_eq!(converter.to_original(second).unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn decrypts_with_the_spec_recorded_in_the_envelope() {
        // Store a value under the non-preferred suite, as if the preferred
        // parameters changed after it was written.
        let key_store = Arc::new(InMemoryKeyStore::new());
        let encryptor = Arc::new(DefaultValueEncryptor::new(key_store));
        let converter = EncryptedValueConverter::new("prefs", Arc::clone(&encryptor) as Arc<dyn ValueEncryptor>);

        let legacy_spec = TransformationSpec::new("AES", "GCM_SIV", "NoPadding");
        let payload = encryptor.encrypt("prefs", &legacy_spec, b"legacy").unwrap();
        let wrapper = MessageWrapper::new(Arc::new(TransformationSpecProvider::new()));
        let envelope = wrapper
            .wrap(&payload.initialization_vector, &legacy_spec, &payload.ciphertext)
            .unwrap();

        assert_eq!(
            converter.to_original(Some(envelope)).unwrap(),
            Some(b"legacy".to_vec())
        );
    }

    #[test]
    fn garbage_input_is_a_format_error() {
        let converter = converter();
        let err = converter
            .to_original(Some(vec![9, 9, 9, 9]))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Format(_)));
    }

    #[test]
    fn tampered_envelope_fails_decryption() {
        let converter = converter();
        let mut stored = converter.to_stored(Some(b"tamper".to_vec())).unwrap().unwrap();
        let last = stored.len() - 1;
        stored[last] ^= 0xFF;
        let err = converter.to_original(Some(stored)).unwrap_err();
        assert!(matches!(err, ConvertError::Crypto(_)));
    }

    #[test]
    fn encryption_failure_routes_to_default_handler() {
        let mut mock = MockValueEncryptor::new();
        mock.expect_encrypt()
            .returning(|_, _, _| Err(CryptoError::Aead));
        let converter = EncryptedValueConverter::new("prefs", Arc::new(mock));

        let err = converter.to_stored(Some(b"x".to_vec())).unwrap_err();
        assert!(matches!(err, ConvertError::Crypto(_)));
    }

    #[test]
    fn custom_encryption_handler_may_substitute() {
        let mut mock = MockValueEncryptor::new();
        mock.expect_encrypt()
            .returning(|_, _, _| Err(CryptoError::Aead));
        let converter = EncryptedValueConverter::new("prefs", Arc::new(mock))
            .on_encryption_error(|_, plaintext| Ok(plaintext.to_vec()));

        assert_eq!(
            converter.to_stored(Some(b"keep".to_vec())).unwrap(),
            Some(b"keep".to_vec())
        );
    }

    #[test]
    fn non_null_chain_round_trips_text() {
        use convert::{Base64ValueConverter, Utf8BytesValueConverter};

        let chain = Utf8BytesValueConverter::new()
            .then(converter())
            .then(Base64ValueConverter::new())
            .non_null();

        let stored = chain.to_stored("token-123".to_owned()).unwrap();
        assert_ne!(stored, "token-123");
        assert_eq!(chain.to_original(stored).unwrap(), "token-123");
    }

    #[test]
    fn custom_decryption_handler_may_substitute() {
        let converter = converter().on_decryption_error(|_, _| Ok(b"fallback".to_vec()));
        // A valid envelope whose ciphertext fails authentication.
        let mut stored = converter.to_stored(Some(b"value".to_vec())).unwrap().unwrap();
        let last = stored.len() - 1;
        stored[last] ^= 0xFF;
        assert_eq!(
            converter.to_original(Some(stored)).unwrap(),
            Some(b"fallback".to_vec())
        );
    }
}
