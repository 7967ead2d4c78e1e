//! # Credential Errors
//!
//! Typed failures of the credential engine. Verification outcomes (`valid`,
//! `invalid`) are not errors; they come back as a
//! [`VerificationReport`](crate::VerificationReport).

use badge_core::{CanonicalizationError, CryptoError};
use thiserror::Error;

/// Error raised by credential building, signing, publication, or verification.
#[derive(Error, Debug)]
pub enum VcError {
    /// Caller-supplied data is incomplete (empty recipient or achievement id).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A Multikey controller URL is not the issuer profile endpoint.
    #[error("invalid controller: {0}")]
    InvalidController(String),

    /// Input is neither a compact token nor a credential JSON object, or is
    /// missing the parts needed to check it.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// Key lookup, encoding, or signing failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Canonicalization of the credential failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VcError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedCredential(msg.into())
    }
}
