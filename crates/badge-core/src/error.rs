//! # Error Types — Shared Error Taxonomy
//!
//! Errors raised by the engine's pure operations. All use `thiserror`.
//! The HTTP layer maps each variant to exactly one status code; nothing
//! here is retried or swallowed.
//!
//! Messages never contain key material. Where a key is relevant, only its
//! derived key identifier appears.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations and key handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A requested key identifier does not match the configured key.
    ///
    /// Surfaced to HTTP callers as "not found" so stale or guessed key ids
    /// reveal nothing about which keys exist.
    #[error("key {requested} does not match the configured key")]
    KeyMismatch {
        /// The identifier the caller asked for.
        requested: String,
    },

    /// Text could not be decoded (base58, base64url, hex, multicodec header).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Key material could not be parsed or is unsuitable.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The key required for this operation was not configured at startup.
    #[error("{0} signing key is not configured")]
    NotConfigured(&'static str),
}

/// Validation failure for a core value type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Timestamp was not RFC 3339 or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Issuer base URL or host could not be used as an issuer origin.
    #[error("invalid issuer origin: {0}")]
    InvalidOrigin(String),
}
