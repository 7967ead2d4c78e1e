//! # Data-Integrity Proof
//!
//! The `proof` object attached to a scheme A credential.
//!
//! The signature covers the JCS canonical bytes of the whole credential with
//! this object embedded and `proofValue` absent. Verification removes
//! `proofValue` and recomputes exactly those bytes.

use serde::{Deserialize, Serialize};

use badge_core::Timestamp;

/// Proof `type` for Data Integrity proofs.
pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";

/// Cryptosuite: Ed25519 over JCS-canonicalized JSON.
pub const EDDSA_JCS_2022: &str = "eddsa-jcs-2022";

/// The issuer asserts the credential claims.
pub const ASSERTION_METHOD: &str = "assertionMethod";

/// A Data Integrity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIntegrityProof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub cryptosuite: String,
    pub created: Timestamp,
    /// URL of the Multikey document holding the verification key.
    pub verification_method: String,
    pub proof_purpose: String,
    /// Multibase (`z` + base58btc) Ed25519 signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl DataIntegrityProof {
    /// A proof configuration without a value, ready to be signed.
    pub fn unsigned(verification_method: impl Into<String>, created: Timestamp) -> Self {
        Self {
            proof_type: DATA_INTEGRITY_PROOF.to_string(),
            cryptosuite: EDDSA_JCS_2022.to_string(),
            created,
            verification_method: verification_method.into(),
            proof_purpose: ASSERTION_METHOD.to_string(),
            proof_value: None,
        }
    }
}
