//! # Custom Extractors
//!
//! [`RequestOrigin`] resolves the issuer origin a request is served under,
//! and [`extract_json`] maps body rejections onto [`AppError::BadRequest`].

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::Json;

use badge_core::IssuerOrigin;

use crate::error::AppError;
use crate::state::AppState;

/// Issuer origin of the current request.
///
/// `ISSUER_BASE_URL` wins when configured; otherwise the origin is derived
/// from the `Host` header (or the request URI authority).
#[derive(Debug, Clone)]
pub struct RequestOrigin(pub IssuerOrigin);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(origin) = &state.config.issuer_origin {
            return Ok(Self(origin.clone()));
        }
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .ok_or_else(|| AppError::BadRequest("request carries no Host header".into()))?;
        IssuerOrigin::from_host(host)
            .map(Self)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}
