//! # Key Identifier Derivation
//!
//! A key identifier is `key-` followed by the first 8 characters of the
//! lowercase hex form of a public key. It is a pure function of the key
//! bytes, so every process holding the same key derives the same id.

use serde::{Deserialize, Serialize};

use badge_core::CryptoError;

const KEY_ID_PREFIX: &str = "key-";
const KEY_ID_HEX_CHARS: usize = 8;

/// A derived key identifier such as `key-1b2d3c4d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the key identifier for a hex-encoded public key.
///
/// Malformed hex is not detected here; callers pass keys that were already
/// parsed.
pub fn derive_key_id(public_key_hex: &str) -> KeyId {
    let prefix: String = public_key_hex
        .trim()
        .chars()
        .take(KEY_ID_HEX_CHARS)
        .collect::<String>()
        .to_ascii_lowercase();
    KeyId(format!("{KEY_ID_PREFIX}{prefix}"))
}

/// Check that `requested_id` is the identifier of the configured key.
///
/// # Errors
///
/// `CryptoError::KeyMismatch` when the identifiers differ.
pub fn validate_key_id(requested_id: &str, configured_public_key_hex: &str) -> Result<KeyId, CryptoError> {
    let expected = derive_key_id(configured_public_key_hex);
    if expected.as_str() == requested_id {
        Ok(expected)
    } else {
        Err(CryptoError::KeyMismatch {
            requested: requested_id.to_string(),
        })
    }
}
