//! # Multikey Codec
//!
//! Self-describing text form of an Ed25519 public key:
//!
//! ```text
//! 'z' ‖ base58btc( 0xed 0x01 ‖ public_key[32] )
//! ```
//!
//! `0xed 0x01` is the unsigned-varint multicodec header for `ed25519-pub`.
//! The `z` multibase prefix selects the bitcoin base58 alphabet, which has no
//! `0`, `O`, `I`, `l`, `+`, `/`, `=` or `_`. The decoder rejects any of those.
//!
//! Proof values use the same multibase prefix over the raw 64-byte
//! signature, without a multicodec header.

use badge_core::CryptoError;

use crate::ed25519::Ed25519Signature;

/// Multibase prefix for base58btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Multicodec header for an Ed25519 public key.
pub const ED25519_PUB_HEADER: [u8; 2] = [0xed, 0x01];

/// Encode a raw Ed25519 public key as a Multikey string.
pub fn encode_multikey(public_key: &[u8; 32]) -> String {
    let mut buf = Vec::with_capacity(ED25519_PUB_HEADER.len() + public_key.len());
    buf.extend_from_slice(&ED25519_PUB_HEADER);
    buf.extend_from_slice(public_key);
    format!("{MULTIBASE_BASE58BTC}{}", bs58::encode(buf).into_string())
}

/// Decode a Multikey string back to the raw 32-byte Ed25519 public key.
///
/// # Errors
///
/// `CryptoError::InvalidEncoding` when the `z` prefix is missing, a character
/// is outside the base58btc alphabet, the multicodec header is not
/// `ed25519-pub`, or the key is not 32 bytes.
pub fn decode_multikey(text: &str) -> Result<[u8; 32], CryptoError> {
    let bytes = decode_base58btc(text)?;
    let Some(key) = bytes.strip_prefix(&ED25519_PUB_HEADER[..]) else {
        return Err(CryptoError::InvalidEncoding(
            "multicodec header is not ed25519-pub (0xed01)".to_string(),
        ));
    };
    key.try_into().map_err(|_| {
        CryptoError::InvalidEncoding(format!("Ed25519 key must be 32 bytes, got {}", key.len()))
    })
}

/// Encode a signature as a multibase (`z` + base58btc) proof value.
pub fn encode_multibase_signature(signature: &Ed25519Signature) -> String {
    format!(
        "{MULTIBASE_BASE58BTC}{}",
        bs58::encode(signature.as_bytes()).into_string()
    )
}

/// Decode a multibase proof value into a signature.
pub fn decode_multibase_signature(text: &str) -> Result<Ed25519Signature, CryptoError> {
    let bytes = decode_base58btc(text)?;
    Ed25519Signature::from_slice(&bytes)
}

fn decode_base58btc(text: &str) -> Result<Vec<u8>, CryptoError> {
    let Some(body) = text.strip_prefix(MULTIBASE_BASE58BTC) else {
        return Err(CryptoError::InvalidEncoding(
            "multibase value must start with 'z'".to_string(),
        ));
    };
    bs58::decode(body)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| CryptoError::InvalidEncoding(format!("base58btc: {e}")))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn multikey_round_trip(key in prop::array::uniform32(any::<u8>())) {
            prop_assert_eq!(decode_multikey(&encode_multikey(&key)).unwrap(), key);
        }

        #[test]
        fn decode_never_panics(text in "\\PC{0,80}") {
            let _ = decode_multikey(&text);
        }
    }
}
