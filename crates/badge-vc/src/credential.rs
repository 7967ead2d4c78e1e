//! # Credential Builder
//!
//! Assembles an unsigned OpenBadges 3.0 `OpenBadgeCredential` from
//! caller-supplied recipient, achievement, and issuer data. Pure: no network,
//! storage, or clock access beyond the `issued_at` argument.
//!
//! ## Wire Shape
//!
//! ```json
//! {
//!   "@context": ["https://www.w3.org/ns/credentials/v2", "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json"],
//!   "id": "urn:uuid:…",
//!   "type": ["VerifiableCredential", "OpenBadgeCredential"],
//!   "issuer": { "id": "https://…/api/badge/issuer", "type": "Profile", "name": "…" },
//!   "validFrom": "2026-01-15T12:00:00Z",
//!   "name": "Speaker",
//!   "credentialSubject": {
//!     "id": "mailto:ada@example.dev",
//!     "type": "AchievementSubject",
//!     "achievement": { "id": "…", "type": "Achievement", "name": "…", "description": "…", "criteria": { "narrative": "…" } }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use badge_core::Timestamp;

use crate::error::VcError;

/// W3C Verifiable Credentials Data Model 2.0 context.
pub const CREDENTIALS_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";

/// OpenBadges 3.0 JSON-LD context.
pub const OPENBADGES_V3_CONTEXT: &str = "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json";

/// The badge holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Subject identifier, typically `mailto:` or a profile URL.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// What the badge is awarded for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Stable identifier of the achievement (URL or URN).
    pub id: String,
    /// Short name, e.g. "Speaker".
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Narrative of the criteria that were met.
    #[serde(default)]
    pub criteria: String,
    /// Image URL for the achievement artwork.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Issuer profile as embedded in a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    /// Canonical issuer profile URL.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl IssuerRef {
    /// A `Profile` issuer with the given canonical id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "Profile".to_string(),
            name: name.into(),
            url: None,
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The `achievement` object inside the credential subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementClaim {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub criteria: Criteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

/// The `credentialSubject` of an OpenBadge credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSubject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub achievement: AchievementClaim,
}

/// An unsigned OpenBadges 3.0 credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenBadgeCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: IssuerRef,
    pub valid_from: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,
    pub name: String,
    pub credential_subject: AchievementSubject,
}

impl OpenBadgeCredential {
    /// Replace the generated `urn:uuid:` id, e.g. with the badge JSON URL.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set an expiry. Verification reports an expired credential as invalid.
    pub fn with_valid_until(mut self, valid_until: Timestamp) -> Self {
        self.valid_until = Some(valid_until);
        self
    }
}

/// Assemble an unsigned credential.
///
/// # Errors
///
/// `VcError::InvalidInput` when the recipient, achievement, or issuer id is
/// empty.
pub fn build_credential(
    recipient: &Recipient,
    achievement: &Achievement,
    issuer: &IssuerRef,
    issued_at: Timestamp,
) -> Result<OpenBadgeCredential, VcError> {
    require_non_empty("recipient id", &recipient.id)?;
    require_non_empty("achievement id", &achievement.id)?;
    require_non_empty("issuer id", &issuer.id)?;

    Ok(OpenBadgeCredential {
        context: vec![
            CREDENTIALS_V2_CONTEXT.to_string(),
            OPENBADGES_V3_CONTEXT.to_string(),
        ],
        id: format!("urn:uuid:{}", Uuid::new_v4()),
        types: vec![
            "VerifiableCredential".to_string(),
            "OpenBadgeCredential".to_string(),
        ],
        issuer: issuer.clone(),
        valid_from: issued_at,
        valid_until: None,
        name: achievement.name.clone(),
        credential_subject: AchievementSubject {
            id: recipient.id.trim().to_string(),
            kind: "AchievementSubject".to_string(),
            name: recipient.name.clone(),
            achievement: AchievementClaim {
                id: achievement.id.trim().to_string(),
                kind: "Achievement".to_string(),
                name: achievement.name.clone(),
                description: achievement.description.clone(),
                criteria: Criteria {
                    narrative: achievement.criteria.clone(),
                },
                image: achievement.image.as_ref().map(|id| ImageRef {
                    id: id.clone(),
                    kind: "Image".to_string(),
                }),
            },
        },
    })
}

fn require_non_empty(field: &str, value: &str) -> Result<(), VcError> {
    if value.trim().is_empty() {
        return Err(VcError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
