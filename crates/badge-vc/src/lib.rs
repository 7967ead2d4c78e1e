//! # badge-vc — OpenBadges 3.0 Credentials
//!
//! Issuance and verification of conference badges as OpenBadges 3.0
//! Verifiable Credentials, in two signature forms:
//!
//! | Form | Signature | Key published as |
//! |------|-----------|------------------|
//! | Data-Integrity | Ed25519 `proof` object, `eddsa-jcs-2022` | Multikey document |
//! | Token | RS256 compact `header.payload.signature` | RSA JWK in the issuer profile |
//!
//! ## Flow
//!
//! ```text
//! issue:  build_credential → BadgeSigner::sign → bake (optional)
//! verify: extract (if SVG) → SignedCredential::parse → Verifier::verify
//! ```
//!
//! [`SignedCredential`] is the only discriminator between the two forms; the
//! baker and the verifier both dispatch on it.

pub mod bake;
pub mod credential;
pub mod error;
pub mod proof;
pub mod publication;
pub mod signed;
pub mod signer;
pub mod template;
pub mod token;
pub mod verifier;

pub use bake::{bake, extract, BakeError, OPENBADGES_NAMESPACE};
pub use credential::{build_credential, Achievement, IssuerRef, OpenBadgeCredential, Recipient};
pub use error::VcError;
pub use proof::DataIntegrityProof;
pub use publication::{
    build_issuer_profile, build_key_set, build_multikey_document, ed25519_jwk, Conference,
    MultikeyDocument, RSA_KEY_FRAGMENT,
};
pub use signed::{is_token_form, CredentialForm, SignedCredential};
pub use signer::{sign_data_integrity, sign_token, BadgeSigner};
pub use template::render_badge_svg;
pub use token::TokenClaims;
pub use verifier::{VerificationReport, VerificationStatus, Verifier, VERIFICATION_STATUS_FIELD};
