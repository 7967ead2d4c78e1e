//! # Canonical Serialization — JCS Signing Input
//!
//! `CanonicalBytes` is the sole construction path for bytes that are signed
//! or verified anywhere in the badge engine.
//!
//! ## Security Invariant
//!
//! The inner buffer is private. The only constructor is
//! [`CanonicalBytes::new()`], which rejects floats and then serializes with
//! `serde_jcs` (RFC 8785): sorted keys, compact separators, deterministic
//! output. Signing APIs accept `&CanonicalBytes`, so a credential can never
//! be signed over one serialization and verified over another.
//!
//! ## Coercion Rules
//!
//! 1. `null`, `bool`, `string`, integers pass through unchanged.
//! 2. Non-integer numbers are rejected. Credential documents carry no
//!    fractional values, and JCS number formatting is the most common source
//!    of cross-implementation divergence.
//! 3. Objects and arrays are recursed.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No float values appear in the output.
/// - Object keys are sorted, separators are compact.
/// - The content is valid UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, and `CanonicalizationError::SerializationFailed`
    /// if serde or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let s = serde_jcs::to_string(&coerced)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as a string.
    ///
    /// Always succeeds in practice: JCS output is UTF-8 by construction.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_keys_with_compact_separators() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(cb.as_str(), r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = serde_json::json!({
            "proof": {"type": "DataIntegrityProof", "created": "2026-01-15T12:00:00Z"},
            "@context": ["https://www.w3.org/ns/credentials/v2"]
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            cb.as_str(),
            r#"{"@context":["https://www.w3.org/ns/credentials/v2"],"proof":{"created":"2026-01-15T12:00:00Z","type":"DataIntegrityProof"}}"#
        );
    }

    #[test]
    fn float_is_rejected() {
        let data = serde_json::json!({"score": 1.5});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 1.5),
            other => panic!("expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn deeply_nested_float_is_rejected() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.25}]}});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn integers_and_null_pass_through() {
        let data = serde_json::json!({"nbf": 1767225600, "exp": null, "neg": -3});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), r#"{"exp":null,"nbf":1767225600,"neg":-3}"#);
    }

    #[test]
    fn unicode_is_emitted_as_utf8() {
        let data = serde_json::json!({"name": "Zürich Rust Days"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(cb.as_str().contains("Zürich"));
    }

    #[test]
    fn empty_object_and_len() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(cb.len(), 2);
        assert!(!cb.is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ :/#.-]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z@]{1,10}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonicalization_is_deterministic(value in json_value_no_floats()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_output_parses_back_to_same_value(value in json_value_no_floats()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        #[test]
        fn fractional_numbers_always_rejected(f in any::<f64>().prop_filter("fractional", |f| {
            f.is_finite() && f.fract() != 0.0
        })) {
            let data = serde_json::json!({"val": f});
            prop_assert!(CanonicalBytes::new(&data).is_err());
        }
    }
}
