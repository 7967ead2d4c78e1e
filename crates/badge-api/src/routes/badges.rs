//! # Badge Endpoints
//!
//! - `POST /api/badge` — issue a badge (bearer token when configured).
//! - `GET /api/badge/:badge_id/json` — the signed credential as stored.
//! - `GET /api/badge/:badge_id/verify` — verification report.
//! - `GET /api/badge/:badge_id/image` — baked SVG.
//! - `GET /api/badge/:badge_id/download` — baked SVG as an attachment.
//!
//! A badge is only served under the domain it was issued for; any other
//! domain gets the same 404 as an unknown id. Reads under another port of
//! that domain are verified against the origin recorded at issuance.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use badge_core::{IssuerOrigin, Timestamp};
use badge_vc::{
    bake, build_credential, render_badge_svg, Achievement, BadgeSigner, CredentialForm, Recipient,
    SignedCredential, VerificationReport, Verifier,
};

use super::{CACHE_HOURLY, CACHE_IMMUTABLE};
use crate::error::AppError;
use crate::extractors::{extract_json, RequestOrigin};
use crate::state::{AppState, BadgeRecord};

// -- Request / Response Types -------------------------------------------------

/// Body of `POST /api/badge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueBadgeRequest {
    pub recipient: Recipient,
    pub achievement: Achievement,
    /// Signature scheme; Data-Integrity unless asked otherwise.
    #[serde(default = "default_form")]
    pub format: CredentialForm,
    /// Artwork to bake into. Validated at issuance; the default template is
    /// rendered when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,
}

fn default_form() -> CredentialForm {
    CredentialForm::DataIntegrity
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeUrls {
    pub json: String,
    pub verify: String,
    pub image: String,
    pub download: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueBadgeResponse {
    pub id: Uuid,
    pub format: CredentialForm,
    /// JSON object for Data-Integrity credentials, compact string for tokens.
    pub credential: Value,
    pub urls: BadgeUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyBadgeResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub report: VerificationReport,
}

// -- Routers ------------------------------------------------------------------

/// Public read endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/badge/:badge_id/json", get(badge_json))
        .route("/api/badge/:badge_id/verify", get(verify_badge))
        .route("/api/badge/:badge_id/image", get(badge_image))
        .route("/api/badge/:badge_id/download", get(download_badge))
}

/// Issuance; `app()` layers authentication on top.
pub fn issue_router() -> Router<AppState> {
    Router::new().route("/api/badge", post(issue_badge))
}

// -- Handlers -----------------------------------------------------------------

async fn issue_badge(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    body: Result<Json<IssueBadgeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssueBadgeResponse>), AppError> {
    let req = extract_json(body)?;
    let conference = state.conference_for(&origin);
    let id = Uuid::new_v4();

    let mut credential = build_credential(
        &req.recipient,
        &req.achievement,
        &conference.issuer_ref(&origin),
        Timestamp::now(),
    )?
    .with_id(origin.badge_json_url(&id));
    if let Some(valid_until) = req.valid_until {
        credential = credential.with_valid_until(valid_until);
    }

    let signed = BadgeSigner::new(&state.keys, &origin).sign(&credential, req.format)?;
    if let Some(svg) = &req.svg {
        bake(svg, &signed)?;
    }

    let text = signed.to_embedded_text()?;
    let credential_json = match &signed {
        SignedCredential::DataIntegrity(map) => Value::Object(map.clone()),
        SignedCredential::Token(token) => Value::String(token.clone()),
    };

    state.badges.insert(
        id,
        BadgeRecord {
            id,
            origin: origin.clone(),
            form: req.format,
            credential: text,
            svg: req.svg,
            achievement_name: req.achievement.name,
            recipient_name: req.recipient.name,
            issued_at: credential.valid_from,
        },
    );
    tracing::info!(badge_id = %id, form = %req.format, domain = origin.domain(), "badge issued");

    let response = IssueBadgeResponse {
        id,
        format: req.format,
        credential: credential_json,
        urls: BadgeUrls {
            json: origin.badge_json_url(&id),
            verify: origin.badge_verify_url(&id),
            image: origin.badge_image_url(&id),
            download: origin.badge_download_url(&id),
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn badge_json(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Path(badge_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = find_badge(&state, &origin, &badge_id)?;
    let content_type = match record.form {
        CredentialForm::DataIntegrity => "application/json",
        CredentialForm::Token => "application/jwt",
    };
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, CACHE_IMMUTABLE),
        ],
        record.credential,
    ))
}

async fn verify_badge(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Path(badge_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = find_badge(&state, &origin, &badge_id)?;
    let report = Verifier::new(&state.keys, &record.origin).verify_text(&record.credential)?;
    tracing::info!(badge_id = %record.id, status = %report.status, "badge verified");
    Ok((
        [(header::CACHE_CONTROL, CACHE_HOURLY)],
        Json(VerifyBadgeResponse {
            valid: report.is_valid(),
            report,
        }),
    ))
}

async fn badge_image(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Path(badge_id): Path<String>,
) -> Result<Response, AppError> {
    baked_badge(&state, &origin, &badge_id, false)
}

async fn download_badge(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Path(badge_id): Path<String>,
) -> Result<Response, AppError> {
    baked_badge(&state, &origin, &badge_id, true)
}

// -- Helpers ------------------------------------------------------------------

fn find_badge(state: &AppState, origin: &IssuerOrigin, badge_id: &str) -> Result<BadgeRecord, AppError> {
    let not_found = || AppError::NotFound(format!("badge {badge_id} not found"));
    let id = Uuid::parse_str(badge_id).map_err(|_| not_found())?;
    let record = state.badges.get(&id).ok_or_else(not_found)?;
    if record.origin.domain() != origin.domain() {
        tracing::debug!(badge_id = %id, domain = origin.domain(), "badge requested under foreign domain");
        return Err(not_found());
    }
    Ok(record)
}

fn baked_badge(
    state: &AppState,
    origin: &IssuerOrigin,
    badge_id: &str,
    attachment: bool,
) -> Result<Response, AppError> {
    let record = find_badge(state, origin, badge_id)?;
    let artwork = match &record.svg {
        Some(svg) => svg.clone(),
        None => {
            let conference = state.conference_for(&record.origin);
            render_badge_svg(&record.achievement_name, &conference.name, record.recipient_name.as_deref())
        }
    };
    let signed = SignedCredential::parse(&record.credential)
        .map_err(|e| AppError::Internal(format!("stored badge {} is unreadable: {e}", record.id)))?;
    let baked = bake(&artwork, &signed)
        .map_err(|e| AppError::Internal(format!("baking badge {}: {e}", record.id)))?;

    let mut response = (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, CACHE_IMMUTABLE),
        ],
        baked,
    )
        .into_response();
    if attachment {
        let disposition = format!("attachment; filename=\"badge-{}.svg\"", record.id);
        let value = HeaderValue::from_str(&disposition).map_err(|e| AppError::Internal(e.to_string()))?;
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
