//! # Verification
//!
//! Every verification re-derives trust from the configured keys; nothing is
//! cached and no key is fetched from the network.
//!
//! ## Data-Integrity
//!
//! 1. `proof.verificationMethod` must equal the Multikey URL of the
//!    configured Ed25519 key under this origin, otherwise `KeyMismatch`.
//! 2. The key is taken from the Multikey document built for that URL.
//! 3. `proofValue` is removed and the remaining document canonicalized.
//! 4. The Ed25519 signature is checked over those bytes, then `validUntil`.
//!
//! ## Token
//!
//! The header must name `RS256`; the signature is checked with the
//! configured RSA key, then `exp` against the verifier's clock.
//!
//! Signature failures and expiry are reported as
//! [`VerificationStatus::Invalid`], not as errors.

use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use badge_core::{CanonicalBytes, CryptoError, IssuerOrigin, Timestamp};
use badge_crypto::{decode_multibase_signature, decode_multikey, verify, Ed25519PublicKey, KeyMaterial};

use crate::error::VcError;
use crate::proof::EDDSA_JCS_2022;
use crate::publication::build_multikey_document;
use crate::signed::{CredentialForm, SignedCredential};
use crate::token::decode_parts;

/// Field added to the reported credential. Credentials that already carry
/// it are malformed.
pub const VERIFICATION_STATUS_FIELD: &str = "verificationStatus";

/// Outcome of verifying one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Valid,
    Invalid,
    /// The credential names a key this issuer does not publish.
    NotFound,
    Malformed,
}

impl VerificationStatus {
    /// The status a verification error stands for, if it is a client-side
    /// outcome rather than a configuration problem.
    pub fn from_error(err: &VcError) -> Option<Self> {
        match err {
            VcError::MalformedCredential(_) | VcError::Canonicalization(_) | VcError::Json(_) => {
                Some(Self::Malformed)
            }
            VcError::Crypto(CryptoError::KeyMismatch { .. }) => Some(Self::NotFound),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::NotFound => "not_found",
            Self::Malformed => "malformed",
        })
    }
}

/// Result of a verification with the annotated credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<CredentialForm>,
    /// The credential (or decoded token payload) with `verificationStatus` added.
    pub credential: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationReport {
    /// True only for [`VerificationStatus::Valid`].
    pub fn is_valid(&self) -> bool {
        self.status == VerificationStatus::Valid
    }

    /// Callers have already rejected credentials carrying
    /// [`VERIFICATION_STATUS_FIELD`], so the annotation adds a field and
    /// never replaces one.
    fn new(
        status: VerificationStatus,
        form: CredentialForm,
        mut credential: Map<String, Value>,
        reason: Option<String>,
    ) -> Self {
        credential.insert(VERIFICATION_STATUS_FIELD.into(), Value::String(status.to_string()));
        Self {
            status,
            form: Some(form),
            credential: Value::Object(credential),
            reason,
        }
    }

    fn from_error(status: VerificationStatus, err: &VcError) -> Self {
        Self {
            status,
            form: None,
            credential: Value::Null,
            reason: Some(err.to_string()),
        }
    }
}

/// Checks credentials against the deployment's keys under one issuer origin.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    keys: &'a KeyMaterial,
    origin: &'a IssuerOrigin,
    now: Timestamp,
}

impl<'a> Verifier<'a> {
    pub fn new(keys: &'a KeyMaterial, origin: &'a IssuerOrigin) -> Self {
        Self {
            keys,
            origin,
            now: Timestamp::now(),
        }
    }

    /// Use `now` as the clock for expiry checks.
    pub fn at(mut self, now: Timestamp) -> Self {
        self.now = now;
        self
    }

    /// Verify a classified credential.
    ///
    /// # Errors
    ///
    /// - `VcError::MalformedCredential` if proof material is missing.
    /// - `CryptoError::KeyMismatch` if a Data-Integrity proof names another key.
    /// - `CryptoError::NotConfigured` if the key for the form is absent.
    pub fn verify(&self, credential: &SignedCredential) -> Result<VerificationReport, VcError> {
        match credential {
            SignedCredential::DataIntegrity(document) => self.verify_data_integrity(document),
            SignedCredential::Token(token) => self.verify_token(token),
        }
    }

    /// Parse and verify raw credential text. Client-side failures come back
    /// as `malformed` or `not_found` reports; only configuration errors are
    /// returned as `Err`.
    pub fn verify_text(&self, input: &str) -> Result<VerificationReport, VcError> {
        match SignedCredential::parse(input).and_then(|c| self.verify(&c)) {
            Ok(report) => Ok(report),
            Err(err) => match VerificationStatus::from_error(&err) {
                Some(status) => Ok(VerificationReport::from_error(status, &err)),
                None => Err(err),
            },
        }
    }

    fn verify_data_integrity(&self, document: &Map<String, Value>) -> Result<VerificationReport, VcError> {
        reject_reserved_fields(document)?;
        let invalid = |reason: String| -> Result<VerificationReport, VcError> {
            Ok(VerificationReport::new(
                VerificationStatus::Invalid,
                CredentialForm::DataIntegrity,
                document.clone(),
                Some(reason),
            ))
        };

        let proof = document
            .get("proof")
            .and_then(Value::as_object)
            .ok_or_else(|| VcError::malformed("credential has no proof object"))?;
        let proof_value = proof
            .get("proofValue")
            .and_then(Value::as_str)
            .ok_or_else(|| VcError::malformed("proof has no proofValue"))?;
        let verification_method = proof
            .get("verificationMethod")
            .and_then(Value::as_str)
            .ok_or_else(|| VcError::malformed("proof has no verificationMethod"))?;

        let public_key = self.resolve_multikey(verification_method)?;

        if proof.get("cryptosuite").and_then(Value::as_str) != Some(EDDSA_JCS_2022) {
            return invalid(format!("unsupported cryptosuite; expected {EDDSA_JCS_2022}"));
        }
        let signature = match decode_multibase_signature(proof_value) {
            Ok(sig) => sig,
            Err(e) => return invalid(e.to_string()),
        };

        let mut unsigned = document.clone();
        if let Some(Value::Object(p)) = unsigned.get_mut("proof") {
            p.remove("proofValue");
        }
        let canonical = CanonicalBytes::new(&unsigned)?;
        if let Err(e) = verify(&canonical, &signature, &public_key) {
            return invalid(e.to_string());
        }

        if let Some(valid_until) = document.get("validUntil") {
            let until = valid_until
                .as_str()
                .and_then(|s| Timestamp::parse(s).ok())
                .ok_or_else(|| VcError::malformed("validUntil is not a UTC timestamp"))?;
            if until < self.now {
                return invalid(format!("credential expired at {until}"));
            }
        }

        Ok(VerificationReport::new(
            VerificationStatus::Valid,
            CredentialForm::DataIntegrity,
            document.clone(),
            None,
        ))
    }

    /// The Ed25519 key behind `verification_method`, read back from the
    /// Multikey document this issuer publishes for it.
    fn resolve_multikey(&self, verification_method: &str) -> Result<Ed25519PublicKey, VcError> {
        let key = self.keys.ed25519()?;
        let key_id = self.keys.ed25519_key_id()?;
        if verification_method != self.origin.key_url(key_id.as_str()) {
            return Err(CryptoError::KeyMismatch {
                requested: verification_method.to_string(),
            }
            .into());
        }
        let document = build_multikey_document(
            &key.public_key().to_hex(),
            key_id.as_str(),
            &self.origin.issuer_profile_url(),
        )?;
        Ok(Ed25519PublicKey::from_bytes(decode_multikey(&document.public_key_multibase)?))
    }

    fn verify_token(&self, token: &str) -> Result<VerificationReport, VcError> {
        let parts = decode_parts(token)?;
        reject_reserved_fields(&parts.payload)?;
        let key = self.keys.rsa()?;
        let invalid = |reason: String| -> Result<VerificationReport, VcError> {
            Ok(VerificationReport::new(
                VerificationStatus::Invalid,
                CredentialForm::Token,
                parts.payload.clone(),
                Some(reason),
            ))
        };

        if parts.header.get("alg").and_then(Value::as_str) != Some("RS256") {
            return invalid("token algorithm must be RS256".to_string());
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        if let Err(e) = jsonwebtoken::decode::<Value>(token, key.decoding_key(), &validation) {
            return invalid(format!("token signature rejected: {e}"));
        }

        if let Some(exp) = parts.payload.get("exp") {
            let exp = exp
                .as_i64()
                .ok_or_else(|| VcError::malformed("token exp is not an integer"))?;
            if exp < self.now.epoch_secs() {
                return invalid(format!("token expired at {exp}"));
            }
        }

        Ok(VerificationReport::new(
            VerificationStatus::Valid,
            CredentialForm::Token,
            parts.payload,
            None,
        ))
    }
}

fn reject_reserved_fields(credential: &Map<String, Value>) -> Result<(), VcError> {
    if credential.contains_key(VERIFICATION_STATUS_FIELD) {
        return Err(VcError::malformed(format!(
            "credential already carries {VERIFICATION_STATUS_FIELD}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::tests::sample_credential;
    use crate::signer::{sign_data_integrity, BadgeSigner};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use badge_crypto::{Ed25519KeyPair, RsaKeyPair};

    const ISSUER_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/rsa-issuer.pem"));
    const OTHER_PEM: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/rsa-other.pem"));

    fn keys() -> KeyMaterial {
        KeyMaterial::new(
            Some(Ed25519KeyPair::from_seed(&[3u8; 32])),
            Some(RsaKeyPair::from_pem(ISSUER_PEM, None).unwrap()),
        )
    }

    fn other_keys() -> KeyMaterial {
        KeyMaterial::new(
            Some(Ed25519KeyPair::from_seed(&[4u8; 32])),
            Some(RsaKeyPair::from_pem(OTHER_PEM, None).unwrap()),
        )
    }

    fn origin() -> IssuerOrigin {
        IssuerOrigin::from_host("example.dev").unwrap()
    }

    fn before_expiry() -> Timestamp {
        Timestamp::parse("2026-06-01T00:00:00Z").unwrap()
    }

    fn sign(keys: &KeyMaterial, form: CredentialForm) -> SignedCredential {
        let origin = origin();
        let vc = sample_credential().with_valid_until(Timestamp::parse("2027-01-01T00:00:00Z").unwrap());
        BadgeSigner::new(keys, &origin).sign(&vc, form).unwrap()
    }

    #[test]
    fn data_integrity_valid_and_annotated() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::DataIntegrity);
        let report = Verifier::new(&keys, &origin).at(before_expiry()).verify(&signed).unwrap();
        assert!(report.is_valid(), "{:?}", report.reason);
        assert_eq!(report.form, Some(CredentialForm::DataIntegrity));
        assert_eq!(report.credential["verificationStatus"], "valid");
        assert_eq!(report.credential["credentialSubject"]["id"], "mailto:ada@example.dev");
    }

    #[test]
    fn data_integrity_single_field_mutation_invalid() {
        let keys = keys();
        let origin = origin();
        let SignedCredential::DataIntegrity(mut doc) = sign(&keys, CredentialForm::DataIntegrity) else {
            panic!("expected data integrity form");
        };
        doc["credentialSubject"]["id"] = Value::String("mailto:eve@example.dev".into());
        let report = Verifier::new(&keys, &origin)
            .at(before_expiry())
            .verify(&SignedCredential::DataIntegrity(doc))
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
        assert_eq!(report.credential["verificationStatus"], "invalid");
    }

    #[test]
    fn data_integrity_signed_by_other_key_invalid() {
        let keys = keys();
        let origin = origin();
        let vm = origin.key_url(keys.ed25519_key_id().unwrap().as_str());
        let vc = sample_credential();
        let forged = sign_data_integrity(
            &vc,
            &Ed25519KeyPair::from_seed(&[9u8; 32]),
            &vm,
            vc.valid_from,
        )
        .unwrap();
        let report = Verifier::new(&keys, &origin).verify(&forged).unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
    }

    #[test]
    fn data_integrity_foreign_verification_method_is_key_mismatch() {
        let origin = origin();
        let signed = sign(&other_keys(), CredentialForm::DataIntegrity);
        let keys = keys();
        let err = Verifier::new(&keys, &origin).verify(&signed).unwrap_err();
        assert!(matches!(err, VcError::Crypto(CryptoError::KeyMismatch { .. })));
        assert_eq!(VerificationStatus::from_error(&err), Some(VerificationStatus::NotFound));
    }

    #[test]
    fn data_integrity_without_proof_is_malformed() {
        let keys = keys();
        let origin = origin();
        let doc = serde_json::to_value(sample_credential()).unwrap();
        let err = Verifier::new(&keys, &origin)
            .verify(&SignedCredential::from_value(doc).unwrap())
            .unwrap_err();
        assert!(matches!(err, VcError::MalformedCredential(_)));
    }

    #[test]
    fn data_integrity_past_valid_until_invalid() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::DataIntegrity);
        let report = Verifier::new(&keys, &origin)
            .at(Timestamp::parse("2027-06-01T00:00:00Z").unwrap())
            .verify(&signed)
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
        assert!(report.reason.unwrap().contains("expired"));
    }

    #[test]
    fn token_valid_and_annotated() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::Token);
        let report = Verifier::new(&keys, &origin).at(before_expiry()).verify(&signed).unwrap();
        assert!(report.is_valid(), "{:?}", report.reason);
        assert_eq!(report.form, Some(CredentialForm::Token));
        assert_eq!(report.credential["sub"], "mailto:ada@example.dev");
        assert_eq!(report.credential["verificationStatus"], "valid");
    }

    #[test]
    fn token_payload_mutation_invalid() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::Token);
        let token = signed.as_token().unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        let mut payload: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[1]).unwrap()).unwrap();
        payload["sub"] = Value::String("mailto:eve@example.dev".into());
        let tampered = format!(
            "{}.{}.{}",
            segments[0],
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap()),
            segments[2]
        );
        let report = Verifier::new(&keys, &origin)
            .at(before_expiry())
            .verify(&SignedCredential::Token(tampered))
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
    }

    #[test]
    fn token_from_other_key_invalid() {
        let origin = origin();
        let signed = sign(&other_keys(), CredentialForm::Token);
        let keys = keys();
        let report = Verifier::new(&keys, &origin).at(before_expiry()).verify(&signed).unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
    }

    #[test]
    fn expired_token_invalid() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::Token);
        let report = Verifier::new(&keys, &origin)
            .at(Timestamp::parse("2027-06-01T00:00:00Z").unwrap())
            .verify(&signed)
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
    }

    #[test]
    fn non_rs256_header_invalid() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::Token);
        let token = signed.as_token().unwrap();
        let rest = token.split_once('.').unwrap().1;
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let report = Verifier::new(&keys, &origin)
            .verify(&SignedCredential::Token(format!("{header}.{rest}")))
            .unwrap();
        assert_eq!(report.status, VerificationStatus::Invalid);
    }

    #[test]
    fn preset_status_field_is_malformed() {
        let keys = keys();
        let origin = origin();
        let SignedCredential::DataIntegrity(mut doc) = sign(&keys, CredentialForm::DataIntegrity) else {
            panic!("expected data integrity form");
        };
        doc.insert(VERIFICATION_STATUS_FIELD.into(), Value::String("valid".into()));
        let text = serde_json::to_string(&doc).unwrap();
        let report = Verifier::new(&keys, &origin).at(before_expiry()).verify_text(&text).unwrap();
        assert_eq!(report.status, VerificationStatus::Malformed);
        assert!(report.reason.unwrap().contains(VERIFICATION_STATUS_FIELD));
    }

    #[test]
    fn token_with_preset_status_claim_is_malformed() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::Token);
        let token = signed.as_token().unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        let mut payload: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[1]).unwrap()).unwrap();
        payload[VERIFICATION_STATUS_FIELD] = Value::String("valid".into());
        let forged = format!(
            "{}.{}.{}",
            segments[0],
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap()),
            segments[2]
        );
        let err = Verifier::new(&keys, &origin).verify(&SignedCredential::Token(forged)).unwrap_err();
        assert!(matches!(err, VcError::MalformedCredential(_)));
    }

    #[test]
    fn verify_text_reports_malformed() {
        let keys = keys();
        let origin = origin();
        let report = Verifier::new(&keys, &origin).verify_text("not a credential").unwrap();
        assert_eq!(report.status, VerificationStatus::Malformed);
        assert_eq!(report.form, None);
        assert!(report.reason.is_some());
    }

    #[test]
    fn verify_text_accepts_embedded_text() {
        let keys = keys();
        let origin = origin();
        let signed = sign(&keys, CredentialForm::DataIntegrity);
        let text = signed.to_embedded_text().unwrap();
        let report = Verifier::new(&keys, &origin).at(before_expiry()).verify_text(&text).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn token_without_rsa_key_is_not_configured() {
        let signed = sign(&keys(), CredentialForm::Token);
        let keys = KeyMaterial::new(Some(Ed25519KeyPair::from_seed(&[3u8; 32])), None);
        let origin = origin();
        let err = Verifier::new(&keys, &origin).verify_text(signed.as_token().unwrap()).unwrap_err();
        assert!(matches!(err, VcError::Crypto(CryptoError::NotConfigured("RSA"))));
    }
}
