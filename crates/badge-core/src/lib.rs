//! # badge-core — Foundational Types for the Badge Engine
//!
//! Every other crate in the workspace depends on `badge-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every signature in the engine is computed
//!    over bytes produced by `CanonicalBytes::new()` (RFC 8785 JCS). Signer
//!    and verifier cannot drift apart on serialization.
//!
//! 2. **One issuer origin.** [`IssuerOrigin`] is the only place that decides
//!    scheme and host for issuer URLs. The issuer profile `id`, the Multikey
//!    `controller`, and every `verificationMethod` are derived from it.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] enforces UTC with `Z` suffix and
//!    seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `badge-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod origin;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, CryptoError, ValidationError};
pub use origin::IssuerOrigin;
pub use temporal::Timestamp;
