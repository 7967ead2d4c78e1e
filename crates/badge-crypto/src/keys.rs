//! # Key Material
//!
//! The two signing keys of a deployment, built once at startup and shared
//! read-only (`Arc<KeyMaterial>`) by every handler. Either key may be absent;
//! operations that need a missing key fail with
//! `CryptoError::NotConfigured` instead of aborting the process.

use zeroize::Zeroizing;

use badge_core::CryptoError;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::key_id::{derive_key_id, KeyId};
use crate::rsa::RsaKeyPair;

/// Raw key material as provided by the environment or key files.
#[derive(Clone, Default)]
pub struct KeyConfig {
    /// Ed25519 private key, hex (seed or seed ‖ public).
    pub ed25519_private_hex: Option<Zeroizing<String>>,
    /// Ed25519 public key, hex. Checked against the private key when present.
    pub ed25519_public_hex: Option<String>,
    /// RSA private key, PEM.
    pub rsa_private_pem: Option<Zeroizing<String>>,
    /// RSA public key, PEM. Checked against the private key when present.
    pub rsa_public_pem: Option<String>,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("ed25519_private_hex", &self.ed25519_private_hex.as_ref().map(|_| "[REDACTED]"))
            .field("ed25519_public_hex", &self.ed25519_public_hex)
            .field("rsa_private_pem", &self.rsa_private_pem.as_ref().map(|_| "[REDACTED]"))
            .field("rsa_public_pem", &self.rsa_public_pem.as_ref().map(|_| "<pem>"))
            .finish()
    }
}

/// Signing keys of the issuing deployment.
#[derive(Debug, Default)]
pub struct KeyMaterial {
    ed25519: Option<Ed25519KeyPair>,
    rsa: Option<RsaKeyPair>,
}

impl KeyMaterial {
    /// Assemble key material from already-parsed keys.
    pub fn new(ed25519: Option<Ed25519KeyPair>, rsa: Option<RsaKeyPair>) -> Self {
        Self { ed25519, rsa }
    }

    /// Parse both keys, failing on the first invalid one.
    pub fn from_config(config: &KeyConfig) -> Result<Self, CryptoError> {
        Ok(Self {
            ed25519: Self::load_ed25519(config)?,
            rsa: Self::load_rsa(config)?,
        })
    }

    /// Parse the Ed25519 key. `Ok(None)` when no private key is configured.
    pub fn load_ed25519(config: &KeyConfig) -> Result<Option<Ed25519KeyPair>, CryptoError> {
        let Some(private_hex) = config.ed25519_private_hex.as_deref() else {
            return Ok(None);
        };
        let pair = Ed25519KeyPair::from_hex(private_hex)?;
        if let Some(public_hex) = config.ed25519_public_hex.as_deref() {
            if Ed25519PublicKey::from_hex(public_hex)? != pair.public_key() {
                return Err(CryptoError::InvalidKey(
                    "Ed25519 public key does not belong to the configured private key".into(),
                ));
            }
        }
        Ok(Some(pair))
    }

    /// Parse the RSA key. `Ok(None)` when no private key is configured.
    pub fn load_rsa(config: &KeyConfig) -> Result<Option<RsaKeyPair>, CryptoError> {
        let Some(private_pem) = config.rsa_private_pem.as_deref() else {
            return Ok(None);
        };
        RsaKeyPair::from_pem(private_pem, config.rsa_public_pem.as_deref()).map(Some)
    }

    /// The scheme A key.
    pub fn ed25519(&self) -> Result<&Ed25519KeyPair, CryptoError> {
        self.ed25519.as_ref().ok_or(CryptoError::NotConfigured("Ed25519"))
    }

    /// The scheme B key.
    pub fn rsa(&self) -> Result<&RsaKeyPair, CryptoError> {
        self.rsa.as_ref().ok_or(CryptoError::NotConfigured("RSA"))
    }

    /// Identifier of the configured Ed25519 public key.
    pub fn ed25519_key_id(&self) -> Result<KeyId, CryptoError> {
        Ok(derive_key_id(&self.ed25519()?.public_key().to_hex()))
    }

    /// Whether at least one signing key is available.
    pub fn is_empty(&self) -> bool {
        self.ed25519.is_none() && self.rsa.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/rsa-issuer.pem"));

    fn seed_hex(seed: u8) -> Zeroizing<String> {
        Ed25519KeyPair::from_seed(&[seed; 32]).seed_hex()
    }

    #[test]
    fn empty_config_yields_no_keys() {
        let keys = KeyMaterial::from_config(&KeyConfig::default()).unwrap();
        assert!(keys.is_empty());
        assert_eq!(keys.ed25519().unwrap_err(), CryptoError::NotConfigured("Ed25519"));
        assert_eq!(keys.rsa().unwrap_err(), CryptoError::NotConfigured("RSA"));
    }

    #[test]
    fn loads_both_keys() {
        let config = KeyConfig {
            ed25519_private_hex: Some(seed_hex(1)),
            ed25519_public_hex: Some(Ed25519KeyPair::from_seed(&[1; 32]).public_key().to_hex()),
            rsa_private_pem: Some(Zeroizing::new(ISSUER_PEM.to_string())),
            rsa_public_pem: None,
        };
        let keys = KeyMaterial::from_config(&config).unwrap();
        assert!(keys.ed25519().is_ok());
        assert!(keys.rsa().is_ok());
        assert!(keys.ed25519_key_id().unwrap().as_str().starts_with("key-"));
    }

    #[test]
    fn mismatched_ed25519_public_key_rejected() {
        let config = KeyConfig {
            ed25519_private_hex: Some(seed_hex(1)),
            ed25519_public_hex: Some(Ed25519KeyPair::from_seed(&[2; 32]).public_key().to_hex()),
            ..Default::default()
        };
        assert!(matches!(
            KeyMaterial::load_ed25519(&config),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_never_prints_secrets() {
        let config = KeyConfig {
            ed25519_private_hex: Some(seed_hex(3)),
            rsa_private_pem: Some(Zeroizing::new(ISSUER_PEM.to_string())),
            ..Default::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains(seed_hex(3).as_str()));
        assert!(!dbg.contains("BEGIN PRIVATE KEY"));

        let keys = KeyMaterial::from_config(&config).unwrap();
        let dbg = format!("{keys:?}");
        assert!(dbg.contains("<private>"));
        assert!(!dbg.contains(seed_hex(3).as_str()));
    }
}
