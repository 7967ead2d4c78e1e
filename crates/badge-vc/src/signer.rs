//! # Credential Signing
//!
//! Both schemes sign canonical or fixed-encoding bytes only:
//!
//! - **Data-Integrity**: the credential with an unsigned `proof` embedded is
//!   canonicalized through [`CanonicalBytes`]; the Ed25519 signature over
//!   those bytes becomes the multibase `proofValue`.
//! - **Token**: RS256 over `base64url(header).base64url(claims)`, produced by
//!   `jsonwebtoken`.
//!
//! [`BadgeSigner`] binds the configured keys to an [`IssuerOrigin`] so the
//! verification method URL and the token `kid` always come from the same
//! canonical issuer URL as the published documents.

use jsonwebtoken::{Algorithm, Header};
use serde_json::Value;

use badge_core::{CanonicalBytes, CryptoError, IssuerOrigin, Timestamp};
use badge_crypto::{encode_multibase_signature, Ed25519KeyPair, KeyMaterial, RsaKeyPair};

use crate::credential::OpenBadgeCredential;
use crate::error::VcError;
use crate::proof::DataIntegrityProof;
use crate::publication::RSA_KEY_FRAGMENT;
use crate::signed::{CredentialForm, SignedCredential};
use crate::token::TokenClaims;

/// Attach an `eddsa-jcs-2022` proof to `credential`.
///
/// # Errors
///
/// `VcError::Canonicalization` if the credential contains values that cannot
/// be canonicalized.
pub fn sign_data_integrity(
    credential: &OpenBadgeCredential,
    key: &Ed25519KeyPair,
    verification_method: &str,
    created: Timestamp,
) -> Result<SignedCredential, VcError> {
    let Value::Object(mut document) = serde_json::to_value(credential)? else {
        return Err(VcError::InvalidInput("credential did not serialize to an object".into()));
    };

    let mut proof = DataIntegrityProof::unsigned(verification_method, created);
    document.insert("proof".into(), serde_json::to_value(&proof)?);
    let canonical = CanonicalBytes::new(&document)?;
    let signature = key.sign(&canonical);

    proof.proof_value = Some(encode_multibase_signature(&signature));
    document.insert("proof".into(), serde_json::to_value(&proof)?);
    Ok(SignedCredential::DataIntegrity(document))
}

/// Sign `claims` as an RS256 compact token.
///
/// With `embed_jwk` the public key travels in the header as `jwk`, so a
/// verifier holding the token alone can check which key it names.
///
/// # Errors
///
/// `CryptoError::SigningFailed` if `jsonwebtoken` rejects the key or claims.
pub fn sign_token(
    claims: &TokenClaims,
    key: &RsaKeyPair,
    kid: &str,
    embed_jwk: bool,
) -> Result<SignedCredential, VcError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    if embed_jwk {
        header.jwk = Some(key.public_jwk(Some(kid)));
    }
    let token = jsonwebtoken::encode(&header, claims, key.encoding_key())
        .map_err(|e| CryptoError::SigningFailed(format!("RS256: {e}")))?;
    Ok(SignedCredential::Token(token))
}

/// Signs credentials with the deployment's keys under one issuer origin.
#[derive(Debug, Clone, Copy)]
pub struct BadgeSigner<'a> {
    keys: &'a KeyMaterial,
    origin: &'a IssuerOrigin,
}

impl<'a> BadgeSigner<'a> {
    pub fn new(keys: &'a KeyMaterial, origin: &'a IssuerOrigin) -> Self {
        Self { keys, origin }
    }

    /// Verification method URL for the Ed25519 key.
    pub fn verification_method(&self) -> Result<String, VcError> {
        let key_id = self.keys.ed25519_key_id()?;
        Ok(self.origin.key_url(key_id.as_str()))
    }

    /// `kid` naming the RSA key inside the issuer profile.
    pub fn token_kid(&self) -> String {
        format!("{}#{}", self.origin.issuer_profile_url(), RSA_KEY_FRAGMENT)
    }

    /// Sign `credential` in the requested form. The proof `created` time is
    /// the credential's `validFrom`.
    ///
    /// # Errors
    ///
    /// `CryptoError::NotConfigured` if the key for `form` is absent.
    pub fn sign(
        &self,
        credential: &OpenBadgeCredential,
        form: CredentialForm,
    ) -> Result<SignedCredential, VcError> {
        match form {
            CredentialForm::DataIntegrity => {
                let key = self.keys.ed25519()?;
                let vm = self.verification_method()?;
                sign_data_integrity(credential, key, &vm, credential.valid_from)
            }
            CredentialForm::Token => {
                let key = self.keys.rsa()?;
                let claims = TokenClaims::for_credential(credential)?;
                sign_token(&claims, key, &self.token_kid(), true)
            }
        }
    }
}
