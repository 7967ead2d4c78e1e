//! # Key Publication
//!
//! Documents external verifiers fetch to check badges:
//!
//! - **Key set** (`/.well-known/jwks.json`): one OKP/Ed25519 JWK for the
//!   scheme A key.
//! - **Multikey document** (`/api/badge/issuer/keys/{keyId}`): the scheme A
//!   key in Multikey form. Its `controller` must be the issuer profile URL.
//! - **Issuer profile** (`/api/badge/issuer`): the OpenBadges `Profile` of the
//!   issuing conference with both public keys, or just the RSA JWK when the
//!   `key-1` fragment is requested.
//!
//! ## Controller Invariant
//!
//! The profile `id` and every Multikey `controller` come from
//! [`IssuerOrigin::issuer_profile_url()`]. [`build_multikey_document()`]
//! additionally rejects any controller that is not an issuer profile
//! endpoint URL, so a bare domain or a hand-built URL cannot slip through.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm,
    OctetKeyPairParameters, OctetKeyPairType, PublicKeyUse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use badge_core::origin::ISSUER_PROFILE_PATH;
use badge_core::IssuerOrigin;
use badge_crypto::{derive_key_id, encode_multikey, validate_key_id, Ed25519PublicKey, KeyMaterial};

use crate::credential::{IssuerRef, CREDENTIALS_V2_CONTEXT, OPENBADGES_V3_CONTEXT};
use crate::error::VcError;

/// Fragment naming the RSA key inside the issuer profile.
pub const RSA_KEY_FRAGMENT: &str = "key-1";

/// A published Multikey verification method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultikeyDocument {
    /// `{controller}#{keyId}`.
    pub id: String,
    /// Always `Multikey`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The issuer profile URL.
    pub controller: String,
    /// `z`-prefixed base58btc multicodec key.
    pub public_key_multibase: String,
}

/// Conference metadata backing an issuer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    /// Host the conference is served from; badges are scoped to it.
    pub domain: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Conference {
    /// The issuer object embedded in credentials issued for this conference.
    pub fn issuer_ref(&self, origin: &IssuerOrigin) -> IssuerRef {
        IssuerRef {
            url: Some(self.url.clone().unwrap_or_else(|| origin.base_url())),
            email: self.email.clone(),
            ..IssuerRef::new(origin.issuer_profile_url(), self.name.clone())
        }
    }
}

/// The scheme A key as an OKP JWK, `kid` set to its derived key id.
pub fn ed25519_jwk(public_key: &Ed25519PublicKey) -> Jwk {
    Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_algorithm: Some(KeyAlgorithm::EdDSA),
            key_id: Some(derive_key_id(&public_key.to_hex()).to_string()),
            ..Default::default()
        },
        algorithm: AlgorithmParameters::OctetKeyPair(OctetKeyPairParameters {
            key_type: OctetKeyPairType::OctetKeyPair,
            curve: EllipticCurve::Ed25519,
            x: URL_SAFE_NO_PAD.encode(public_key.as_bytes()),
        }),
    }
}

/// Key-set document with one entry for the scheme A key.
pub fn build_key_set(public_key: &Ed25519PublicKey) -> JwkSet {
    JwkSet {
        keys: vec![ed25519_jwk(public_key)],
    }
}

/// Build the Multikey document for the configured Ed25519 key.
///
/// # Errors
///
/// - `VcError::InvalidController` if `controller_url` is not an `http(s)` URL
///   whose path is exactly the issuer profile endpoint.
/// - `VcError::Crypto(KeyMismatch)` if `key_id` is not derived from the key.
/// - `VcError::Crypto(InvalidKey)` if the key hex is malformed.
pub fn build_multikey_document(
    public_key_hex: &str,
    key_id: &str,
    controller_url: &str,
) -> Result<MultikeyDocument, VcError> {
    check_controller(controller_url)?;
    let public_key = Ed25519PublicKey::from_hex(public_key_hex)?;
    let key_id = validate_key_id(key_id, &public_key.to_hex())?;
    Ok(MultikeyDocument {
        id: format!("{controller_url}#{key_id}"),
        kind: "Multikey".to_string(),
        controller: controller_url.to_string(),
        public_key_multibase: encode_multikey(public_key.as_bytes()),
    })
}

fn check_controller(controller_url: &str) -> Result<(), VcError> {
    let invalid = |why: &str| {
        VcError::InvalidController(format!(
            "controller {controller_url:?} {why}; it must be the issuer profile endpoint URL \
             (e.g. https://example.dev{ISSUER_PROFILE_PATH})"
        ))
    };
    let url = Url::parse(controller_url).map_err(|_| invalid("is not an absolute URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid("is not an http(s) URL with a host"));
    }
    if url.path() != ISSUER_PROFILE_PATH || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("does not end at the issuer profile path"));
    }
    // The controller is published verbatim, so it must already be in the
    // normalized form every issuer profile `id` is written in.
    if url.as_str() != controller_url {
        return Err(invalid("is not in normalized form"));
    }
    Ok(())
}

/// Issuer profile, or only the RSA JWK when `requested_fragment` is `key-1`.
///
/// The fragment may be given with or without its leading `#`.
///
/// # Errors
///
/// `CryptoError::NotConfigured` if the RSA key is requested but absent.
pub fn build_issuer_profile(
    conference: &Conference,
    origin: &IssuerOrigin,
    keys: &KeyMaterial,
    requested_fragment: Option<&str>,
) -> Result<Value, VcError> {
    let issuer_url = origin.issuer_profile_url();
    let rsa_key_id = format!("{issuer_url}#{RSA_KEY_FRAGMENT}");

    let fragment = requested_fragment.map(|f| f.trim_start_matches('#'));
    if fragment == Some(RSA_KEY_FRAGMENT) {
        let jwk = keys.rsa()?.public_jwk(Some(&rsa_key_id));
        return Ok(serde_json::to_value(jwk)?);
    }

    let mut public_keys = Vec::new();
    if let Ok(rsa) = keys.rsa() {
        public_keys.push(json!({
            "id": rsa_key_id,
            "type": "JsonWebKey",
            "controller": issuer_url,
            "publicKeyJwk": rsa.public_jwk(Some(&rsa_key_id)),
        }));
    }
    if let Ok(ed25519) = keys.ed25519() {
        let public_hex = ed25519.public_key().to_hex();
        let key_id = derive_key_id(&public_hex);
        let doc = build_multikey_document(&public_hex, key_id.as_str(), &issuer_url)?;
        public_keys.push(serde_json::to_value(doc)?);
    }
    let assertion_methods: Vec<Value> = public_keys.iter().map(|k| k["id"].clone()).collect();

    let issuer = conference.issuer_ref(origin);
    let mut profile = json!({
        "@context": [CREDENTIALS_V2_CONTEXT, OPENBADGES_V3_CONTEXT],
        "id": issuer.id,
        "type": issuer.kind,
        "name": issuer.name,
        "url": issuer.url,
        "publicKey": public_keys,
        "assertionMethod": assertion_methods,
    });
    if let Some(map) = profile.as_object_mut() {
        if let Some(email) = &conference.email {
            map.insert("email".into(), json!(email));
        }
        if let Some(description) = &conference.description {
            map.insert("description".into(), json!(description));
        }
    }
    Ok(profile)
}
