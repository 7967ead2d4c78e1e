//! # Ed25519 Signing and Verification
//!
//! Scheme A keys. Signs Data-Integrity proofs over canonical credential bytes.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes`. Raw bytes cannot be signed.
//! - `Ed25519KeyPair` does not implement `Serialize` and its `Debug` output
//!   is redacted.
//! - Public keys and signatures serialize as lowercase hex strings.

use ed25519_dalek::{Signer, Verifier};
use rand_core::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use badge_core::{CanonicalBytes, CryptoError};

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair for signing operations.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("public key is not hex: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidKey(format!("public key must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidKey(format!("not a valid Ed25519 point: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", &self.to_hex()[..16])
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create a signature from a byte slice, which must be 64 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidEncoding(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim()).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse a private key from hex.
    ///
    /// Accepts the 32-byte seed (64 hex chars) or the 64-byte `seed ‖ public`
    /// form (128 hex chars). In the latter case the trailing public half must
    /// match the key derived from the seed.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(s.trim())
                .map_err(|_| CryptoError::InvalidKey("private key is not hex".to_string()))?,
        );
        match bytes.len() {
            32 | 64 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(&bytes[..32]);
                let pair = Self::from_seed(&seed);
                if bytes.len() == 64 && pair.public_key().as_bytes()[..] != bytes[32..] {
                    return Err(CryptoError::InvalidKey(
                        "private key carries a public half that does not match its seed"
                            .to_string(),
                    ));
                }
                Ok(pair)
            }
            n => Err(CryptoError::InvalidKey(format!(
                "private key must be 32 or 64 bytes, got {n}"
            ))),
        }
    }

    /// Hex of the 32-byte seed, for writing key files.
    pub fn seed_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over canonical bytes.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(v: serde_json::Value) -> CanonicalBytes {
        CanonicalBytes::new(&v).unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"name": "Speaker", "n": 1}));
        let sig = kp.sign(&data);
        assert!(verify(&data, &sig, &kp.public_key()).is_ok());
    }

    #[test]
    fn wrong_key_fails() {
        let kp = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let other = Ed25519KeyPair::from_seed(&[2u8; 32]);
        let data = canonical(serde_json::json!({"a": 1}));
        let sig = kp.sign(&data);
        assert!(matches!(
            verify(&data, &sig, &other.public_key()),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn tampered_data_fails() {
        let kp = Ed25519KeyPair::from_seed(&[3u8; 32]);
        let sig = kp.sign(&canonical(serde_json::json!({"a": 1})));
        let tampered = canonical(serde_json::json!({"a": 2}));
        assert!(verify(&tampered, &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn from_hex_accepts_seed_and_full_forms() {
        let kp = Ed25519KeyPair::from_seed(&[9u8; 32]);
        let seed_hex = kp.seed_hex();
        let full_hex = format!("{}{}", seed_hex.as_str(), kp.public_key().to_hex());

        let a = Ed25519KeyPair::from_hex(&seed_hex).unwrap();
        let b = Ed25519KeyPair::from_hex(&full_hex).unwrap();
        assert_eq!(a.public_key(), kp.public_key());
        assert_eq!(b.public_key(), kp.public_key());
    }

    #[test]
    fn from_hex_rejects_inconsistent_public_half() {
        let kp = Ed25519KeyPair::from_seed(&[9u8; 32]);
        let other = Ed25519KeyPair::from_seed(&[8u8; 32]);
        let bad = format!("{}{}", kp.seed_hex().as_str(), other.public_key().to_hex());
        assert!(matches!(
            Ed25519KeyPair::from_hex(&bad),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn from_hex_rejects_bad_length_and_chars() {
        assert!(Ed25519KeyPair::from_hex("abcd").is_err());
        assert!(Ed25519KeyPair::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn public_key_hex_round_trip() {
        let pk = Ed25519KeyPair::from_seed(&[4u8; 32]).public_key();
        let parsed = Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(parsed, pk);
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_hex()));
    }

    #[test]
    fn debug_output_is_redacted() {
        let kp = Ed25519KeyPair::from_seed(&[5u8; 32]);
        let dbg = format!("{kp:?}");
        assert_eq!(dbg, "Ed25519KeyPair(<private>)");
        assert!(!dbg.contains(kp.seed_hex().as_str()));
    }
}
