//! # Compact Token Claims
//!
//! Claims carried by a scheme B token, following the VC-JWT mapping:
//!
//! | Claim | Source |
//! |-------|--------|
//! | `iss` | `issuer.id` |
//! | `sub` | `credentialSubject.id` |
//! | `jti` | credential `id` |
//! | `nbf`, `iat` | `validFrom` |
//! | `exp` | `validUntil`, when set |
//! | `vc`  | the full unsigned credential |

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::credential::OpenBadgeCredential;
use crate::error::VcError;

/// Claims of a badge token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub jti: String,
    pub nbf: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    pub vc: Value,
}

impl TokenClaims {
    /// Derive token claims from an unsigned credential.
    pub fn for_credential(credential: &OpenBadgeCredential) -> Result<Self, VcError> {
        let issued = credential.valid_from.epoch_secs();
        Ok(Self {
            iss: credential.issuer.id.clone(),
            sub: credential.credential_subject.id.clone(),
            jti: credential.id.clone(),
            nbf: issued,
            iat: issued,
            exp: credential.valid_until.map(|t| t.epoch_secs()),
            vc: serde_json::to_value(credential)?,
        })
    }
}

/// Decoded header and payload of a compact token. The signature is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenParts {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
}

/// Split a compact token and decode its header and payload objects.
///
/// # Errors
///
/// `VcError::MalformedCredential` if the token does not have three segments,
/// a segment is not base64url, or header/payload is not a JSON object.
pub fn decode_parts(token: &str) -> Result<TokenParts, VcError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(VcError::malformed("token must have exactly three segments"));
    };
    Ok(TokenParts {
        header: decode_segment(header, "header")?,
        payload: decode_segment(payload, "payload")?,
    })
}

fn decode_segment(segment: &str, what: &str) -> Result<Map<String, Value>, VcError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VcError::malformed(format!("token {what} is not base64url")))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(VcError::malformed(format!("token {what} is not a JSON object"))),
    }
}
