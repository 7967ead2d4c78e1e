//! # Key Publication Endpoints
//!
//! - `GET /.well-known/jwks.json` — key set with the Ed25519 key.
//! - `GET /api/badge/issuer/keys/:key_id` — Multikey document, 404 unless
//!   `key_id` is derived from the configured key.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use badge_crypto::validate_key_id;
use badge_vc::{build_key_set, build_multikey_document};

use super::CACHE_KEYS;
use crate::error::AppError;
use crate::extractors::RequestOrigin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/.well-known/jwks.json", get(key_set))
        .route("/api/badge/issuer/keys/:key_id", get(multikey_document))
}

async fn key_set(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let key = state.keys.ed25519()?;
    Ok((
        [(header::CACHE_CONTROL, CACHE_KEYS)],
        Json(build_key_set(&key.public_key())),
    ))
}

async fn multikey_document(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Path(requested): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let public_hex = state.keys.ed25519()?.public_key().to_hex();
    let key_id = validate_key_id(&requested, &public_hex).map_err(|e| {
        tracing::debug!(requested = %requested, "multikey lookup for unknown key id");
        AppError::from(e)
    })?;
    let document = build_multikey_document(&public_hex, key_id.as_str(), &origin.issuer_profile_url())?;
    Ok(([(header::CACHE_CONTROL, CACHE_KEYS)], Json(document)))
}
