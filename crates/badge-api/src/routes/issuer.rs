//! # Issuer Profile Endpoint
//!
//! `GET /api/badge/issuer` serves the OpenBadges issuer profile of the
//! conference behind the request's domain. Browsers never send URL
//! fragments, so `?fragment=key-1` selects the bare RSA JWK that token
//! `kid` values (`…/api/badge/issuer#key-1`) point at.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use badge_core::origin::ISSUER_PROFILE_PATH;
use badge_vc::build_issuer_profile;

use super::CACHE_HOURLY;
use crate::error::AppError;
use crate::extractors::RequestOrigin;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub fragment: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route(ISSUER_PROFILE_PATH, get(issuer_profile))
}

async fn issuer_profile(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    Query(query): Query<ProfileQuery>,
) -> Result<impl IntoResponse, AppError> {
    let conference = state.conference_for(&origin);
    let profile = build_issuer_profile(&conference, &origin, &state.keys, query.fragment.as_deref())?;
    Ok(([(header::CACHE_CONTROL, CACHE_HOURLY)], Json(profile)))
}
