//! Cipher parameter descriptors and the provider that selects them.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

use crate::cipher;

/// Identifies the algorithm/block-mode/padding triple used to produce a
/// ciphertext.
///
/// The canonical string form is `algorithm/block-mode/padding`, e.g.
/// `AES/GCM/NoPadding`. Two specs are equal iff all three fields match;
/// equality (and the hash derived from it) selects which secret key an alias
/// maps to, so distinct specs use distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformationSpec {
    pub algorithm: String,
    pub block_mode: String,
    pub padding: String,
}

impl TransformationSpec {
    pub fn new(
        algorithm: impl Into<String>,
        block_mode: impl Into<String>,
        padding: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            block_mode: block_mode.into(),
            padding: padding.into(),
        }
    }
}

impl fmt::Display for TransformationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.algorithm, self.block_mode, self.padding)
    }
}

/// The transformation string did not split into exactly three segments.
#[derive(Debug, Error)]
#[error("unable to decode the transformation \"{0}\": expected algorithm/block-mode/padding")]
pub struct SpecParseError(pub String);

impl FromStr for TransformationSpec {
    type Err = SpecParseError;

    fn from_str(s: &str) -> Result<Self, SpecParseError> {
        let segments: Vec<&str> = s.split('/').collect();
        let &[algorithm, block_mode, padding] = segments.as_slice() else {
            return Err(SpecParseError(s.to_owned()));
        };
        Ok(Self::new(algorithm, block_mode, padding))
    }
}

/// Discovers which [`TransformationSpec`] this runtime currently prefers.
///
/// The preference depends only on the compiled-in cipher registry, never on
/// data, so the result is memoized after the first computation. Concurrent
/// first calls may race; both compute the same value and either write wins.
pub struct TransformationSpecProvider {
    located: OnceCell<TransformationSpec>,
}

impl TransformationSpecProvider {
    pub fn new() -> Self {
        Self {
            located: OnceCell::new(),
        }
    }

    /// The spec new encryptions should use.
    pub fn supported_spec(&self) -> TransformationSpec {
        self.located
            .get_or_init(|| {
                let spec = cipher::preferred_spec();
                debug!(spec = %spec, "selected preferred transformation");
                spec
            })
            .clone()
    }

    /// Parse a canonical transformation string back into a spec.
    ///
    /// Inverse of [`TransformationSpec`]'s `Display`:
    /// `decode_spec(&spec.to_string()) == spec` for every producible spec.
    pub fn decode_spec(&self, transformation: &str) -> Result<TransformationSpec, SpecParseError> {
        transformation.parse()
    }
}

impl Default for TransformationSpecProvider {
    fn default() -> Self {
        Self::new()
    }
}
