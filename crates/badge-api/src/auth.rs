//! # Issuance Authentication
//!
//! Static bearer token guarding `POST /api/badge`. Every read endpoint is
//! public: verifiers fetch keys, profiles, and badges without credentials.
//!
//! When no token is configured, authentication is disabled and issuance is
//! open (development mode); startup logs a warning.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use crate::error::{ErrorBody, ErrorDetail};

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens. A length mismatch still runs a
/// comparison so timing does not reveal the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject requests whose `Authorization: Bearer` token does not match.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").map(|t| t.trim().to_string()));

    let rejection = match provided {
        Some(Some(token)) if constant_time_token_eq(&token, &expected) => None,
        Some(Some(_)) => Some("invalid bearer token"),
        Some(None) => Some("authorization header must use Bearer scheme"),
        None => Some("missing authorization header"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(reason, "issuance rejected");
            unauthorized_response(reason)
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
