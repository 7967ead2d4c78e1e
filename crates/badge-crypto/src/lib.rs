//! # badge-crypto — Key Material and Key Encodings
//!
//! Holds the two signing keys of an issuing deployment and the encodings used
//! to publish them.
//!
//! - [`ed25519`]: scheme A keys. Signing input is `&CanonicalBytes` only.
//! - [`rsa`]: scheme B keys (RS256 tokens), with public JWK export.
//! - [`key_id`]: `key-` + 8 hex chars, and validation against the configured key.
//! - [`multikey`]: `z` + base58btc(`0xed 0x01` ‖ key) and its inverse.
//! - [`keys`]: [`KeyMaterial`], loaded once at startup and shared read-only.
//!
//! ## Crate Policy
//!
//! - Private keys never implement `Serialize` and are redacted in `Debug`.
//! - Errors are [`badge_core::CryptoError`]; messages never carry key bytes.

pub mod ed25519;
pub mod key_id;
pub mod keys;
pub mod multikey;
pub mod rsa;

pub use badge_core::CryptoError;
pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use key_id::{derive_key_id, validate_key_id, KeyId};
pub use keys::{KeyConfig, KeyMaterial};
pub use multikey::{
    decode_multibase_signature, decode_multikey, encode_multibase_signature, encode_multikey,
};
pub use crate::rsa::{normalize_pem, GeneratedRsaPem, RsaKeyPair, MIN_RSA_BITS};
