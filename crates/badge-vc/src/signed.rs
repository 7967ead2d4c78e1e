//! # Signed Credential Forms
//!
//! [`SignedCredential`] is the single discriminator between the two signature
//! schemes. The baker decides what to embed and the verifier decides how to
//! check by matching on it; neither inspects raw input on its own.
//!
//! ## Classification
//!
//! 1. A string of exactly three non-empty base64url segments joined by `.`
//!    is a compact token.
//! 2. A JSON object is a Data-Integrity credential.
//! 3. A JSON string whose content is a compact token is a token (records
//!    that stored the token JSON-quoted).
//! 4. Anything else is `MalformedCredential`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use badge_core::CanonicalBytes;

use crate::error::VcError;

/// Which signature scheme a credential uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialForm {
    /// Compact RS256 token.
    Token,
    /// JSON credential with an embedded Ed25519 proof.
    DataIntegrity,
}

impl std::fmt::Display for CredentialForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Token => "token",
            Self::DataIntegrity => "data_integrity",
        })
    }
}

/// A signed credential in either form.
#[derive(Debug, Clone, PartialEq)]
pub enum SignedCredential {
    /// `header.payload.signature`.
    Token(String),
    /// Credential object including its `proof`.
    DataIntegrity(Map<String, Value>),
}

/// True iff `input` is three non-empty base64url segments separated by dots.
pub fn is_token_form(input: &str) -> bool {
    let mut segments = 0;
    for segment in input.split('.') {
        segments += 1;
        if segment.is_empty()
            || !segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return false;
        }
    }
    segments == 3
}

impl SignedCredential {
    /// Classify and parse stored or presented credential text.
    pub fn parse(input: &str) -> Result<Self, VcError> {
        let trimmed = input.trim();
        if is_token_form(trimmed) {
            return Ok(Self::Token(trimmed.to_string()));
        }
        let value: Value = serde_json::from_str(trimmed).map_err(|_| {
            VcError::malformed("input is neither a compact token nor a JSON credential")
        })?;
        Self::from_value(value)
    }

    /// Classify an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, VcError> {
        match value {
            Value::Object(map) => Ok(Self::DataIntegrity(map)),
            Value::String(s) if is_token_form(s.trim()) => Ok(Self::Token(s.trim().to_string())),
            Value::String(_) => Err(VcError::malformed("string is not a compact token")),
            _ => Err(VcError::malformed("credential must be a JSON object or a compact token")),
        }
    }

    /// Which scheme this credential uses.
    pub fn form(&self) -> CredentialForm {
        match self {
            Self::Token(_) => CredentialForm::Token,
            Self::DataIntegrity(_) => CredentialForm::DataIntegrity,
        }
    }

    /// Text used for storage and SVG embedding.
    ///
    /// Tokens are returned unchanged; Data-Integrity credentials are
    /// serialized canonically so the text is stable across round trips.
    pub fn to_embedded_text(&self) -> Result<String, VcError> {
        match self {
            Self::Token(token) => Ok(token.clone()),
            Self::DataIntegrity(map) => {
                let canonical = CanonicalBytes::new(map)?;
                Ok(canonical.as_str().to_string())
            }
        }
    }

    /// The compact token, if this is the token form.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(token) => Some(token),
            Self::DataIntegrity(_) => None,
        }
    }

    /// The credential object, if this is the Data-Integrity form.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Token(_) => None,
            Self::DataIntegrity(map) => Some(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_segments_are_token_form() {
        assert!(is_token_form("h.p.s"));
        assert!(is_token_form("eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJhIn0.c2ln-_"));
    }

    #[test]
    fn other_shapes_are_not_token_form() {
        for input in ["", "h.p", "h.p.s.x", "h..s", ".p.s", "h.p.", "h.p.s=", "h.p/s", "{\"a\":1}", " h.p.s"] {
            assert!(!is_token_form(input), "{input:?}");
        }
    }

    #[test]
    fn parse_classifies_token() {
        let cred = SignedCredential::parse("h.p.s").unwrap();
        assert_eq!(cred, SignedCredential::Token("h.p.s".to_string()));
        assert_eq!(cred.form(), CredentialForm::Token);
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let cred = SignedCredential::parse("  h.p.s\n").unwrap();
        assert_eq!(cred.as_token(), Some("h.p.s"));
    }

    #[test]
    fn parse_classifies_json_object() {
        let cred = SignedCredential::parse(r#"{"type":["VerifiableCredential"],"proof":{}}"#).unwrap();
        assert_eq!(cred.form(), CredentialForm::DataIntegrity);
        assert!(cred.as_object().unwrap().contains_key("proof"));
    }

    #[test]
    fn parse_unwraps_quoted_token() {
        let cred = SignedCredential::parse("\"h.p.s\"").unwrap();
        assert_eq!(cred.as_token(), Some("h.p.s"));
    }

    #[test]
    fn parse_rejects_everything_else() {
        for input in ["", "not a credential", "[1,2,3]", "42", "null", "\"plain text\"", "{broken"] {
            assert!(
                matches!(SignedCredential::parse(input), Err(VcError::MalformedCredential(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn embedded_text_is_canonical_for_objects() {
        let cred = SignedCredential::parse(r#"{ "b": 1, "a": "x" }"#).unwrap();
        assert_eq!(cred.to_embedded_text().unwrap(), r#"{"a":"x","b":1}"#);
        let again = SignedCredential::parse(&cred.to_embedded_text().unwrap()).unwrap();
        assert_eq!(again, cred);
    }

    #[test]
    fn embedded_text_is_raw_for_tokens() {
        let cred = SignedCredential::Token("h.p.s".to_string());
        assert_eq!(cred.to_embedded_text().unwrap(), "h.p.s");
    }
}
