//! # API Route Modules
//!
//! - `keys` — key-set document and per-key Multikey documents.
//! - `issuer` — issuer profile, or the bare RSA JWK for `?fragment=key-1`.
//! - `badges` — stored credentials, baked SVGs, verification, and the
//!   authenticated issuance endpoint.

pub mod badges;
pub mod issuer;
pub mod keys;

/// Key documents change only when keys are rotated.
pub(crate) const CACHE_KEYS: &str = "public, max-age=86400";

/// Issuer profile and verification results.
pub(crate) const CACHE_HOURLY: &str = "public, max-age=3600";

/// A signed credential and its baked image never change.
pub(crate) const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
