//! # RSA Keys for Compact Tokens
//!
//! Scheme B keys. Tokens are signed RS256 (RSASSA-PKCS1-v1_5 with SHA-256)
//! through `jsonwebtoken`; this module only owns parsing, size checks, and
//! export of the public half as a JSON Web Key.
//!
//! PEM input may be PKCS#1 (`BEGIN RSA PRIVATE KEY`) or PKCS#8
//! (`BEGIN PRIVATE KEY`). Values read from environment variables often carry
//! literal `\n` sequences instead of line breaks; [`normalize_pem()`] undoes
//! that.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, KeyAlgorithm, PublicKeyUse, RSAKeyParameters,
    RSAKeyType,
};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand_core::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use badge_core::CryptoError;

/// Smallest accepted modulus size.
pub const MIN_RSA_BITS: usize = 2048;

/// An RSA key pair prepared for RS256 signing and verification.
pub struct RsaKeyPair {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public: RsaPublicKey,
}

/// PEM text of a freshly generated key pair.
pub struct GeneratedRsaPem {
    /// PKCS#8 private key.
    pub private_pem: Zeroizing<String>,
    /// SPKI public key.
    pub public_pem: String,
}

impl RsaKeyPair {
    /// Parse a private key PEM, optionally checking it against a public key PEM.
    ///
    /// # Errors
    ///
    /// `CryptoError::InvalidKey` when either PEM fails to parse, the modulus
    /// is smaller than [`MIN_RSA_BITS`], or the public PEM belongs to a
    /// different key.
    pub fn from_pem(private_pem: &str, public_pem: Option<&str>) -> Result<Self, CryptoError> {
        let private_pem = normalize_pem(private_pem);
        let private = if private_pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(&private_pem)
                .map_err(|_| CryptoError::InvalidKey("RSA private key is not valid PKCS#1 PEM".into()))?
        } else {
            RsaPrivateKey::from_pkcs8_pem(&private_pem)
                .map_err(|_| CryptoError::InvalidKey("RSA private key is not valid PKCS#8 PEM".into()))?
        };

        if let Some(public_pem) = public_pem {
            let declared = parse_public_pem(&normalize_pem(public_pem))?;
            if declared != private.to_public_key() {
                return Err(CryptoError::InvalidKey(
                    "RSA public key does not belong to the configured private key".into(),
                ));
            }
        }

        Self::from_private_key(private)
    }

    /// Generate a new key pair and its PEM encodings.
    pub fn generate(bits: usize) -> Result<(Self, GeneratedRsaPem), CryptoError> {
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::InvalidKey(format!(
                "RSA keys must be at least {MIN_RSA_BITS} bits"
            )));
        }
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA key generation failed: {e}")))?;
        let private_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(format!("PKCS#8 encoding failed: {e}")))?;
        let public_pem = private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(format!("SPKI encoding failed: {e}")))?;
        let pair = Self::from_private_key(private)?;
        Ok((pair, GeneratedRsaPem { private_pem, public_pem }))
    }

    fn from_private_key(private: RsaPrivateKey) -> Result<Self, CryptoError> {
        let bits = private.n().bits();
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::InvalidKey(format!(
                "RSA modulus is {bits} bits; at least {MIN_RSA_BITS} required"
            )));
        }
        let private_der = private
            .to_pkcs1_der()
            .map_err(|e| CryptoError::InvalidKey(format!("PKCS#1 encoding failed: {e}")))?;
        let public = private.to_public_key();
        let public_der = public
            .to_pkcs1_der()
            .map_err(|e| CryptoError::InvalidKey(format!("PKCS#1 encoding failed: {e}")))?;
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_der(private_der.as_bytes()),
            decoding_key: DecodingKey::from_rsa_der(public_der.as_bytes()),
            public,
        })
    }

    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.public.n().bits()
    }

    /// Key used by `jsonwebtoken::encode`.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Key used by `jsonwebtoken::decode`.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// The public half as an RS256 signing JWK.
    pub fn public_jwk(&self, kid: Option<&str>) -> Jwk {
        Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Signature),
                key_algorithm: Some(KeyAlgorithm::RS256),
                key_id: kid.map(str::to_string),
                ..Default::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: URL_SAFE_NO_PAD.encode(self.public.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(self.public.e().to_bytes_be()),
            }),
        }
    }

    /// The public half as SPKI PEM.
    pub fn public_pem(&self) -> Result<String, CryptoError> {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(format!("SPKI encoding failed: {e}")))
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaKeyPair({} bits, <private>)", self.modulus_bits())
    }
}

/// Restore line breaks in PEM text taken from an environment variable.
///
/// Strips surrounding quotes and turns literal `\n` / `\r\n` escapes into
/// real newlines. Proper multi-line PEM passes through unchanged.
pub fn normalize_pem(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
}

fn parse_public_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    let parsed = if pem.contains("BEGIN RSA PUBLIC KEY") {
        RsaPublicKey::from_pkcs1_pem(pem).ok()
    } else {
        RsaPublicKey::from_public_key_pem(pem).ok()
    };
    parsed.ok_or_else(|| CryptoError::InvalidKey("RSA public key is not valid PEM".into()))
}
