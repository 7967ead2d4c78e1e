//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Engine errors map one-to-one onto status codes:
//!
//! | Engine error | Status | Code |
//! |--------------|--------|------|
//! | malformed credential, invalid controller, invalid input, bad SVG | 400 | `BAD_REQUEST` |
//! | key mismatch, unknown badge | 404 | `NOT_FOUND` |
//! | signing key absent | 500 | `NOT_CONFIGURED` |
//! | anything else | 500 | `INTERNAL_ERROR` |
//!
//! Internal error messages are logged and never returned to clients. The
//! `NOT_CONFIGURED` message is returned; it names the missing key type only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use badge_core::CryptoError;
use badge_vc::{BakeError, VcError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "NOT_CONFIGURED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request input could not be used (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Key material needed by the endpoint is absent (500, message shown).
    #[error("{0}")]
    NotConfigured(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotConfigured(_) => (StatusCode::INTERNAL_SERVER_ERROR, "NOT_CONFIGURED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::NotConfigured(_) => tracing::error!(error = %self, "signing key not configured"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyMismatch { .. } => Self::NotFound("key not found".into()),
            CryptoError::NotConfigured(_) => Self::NotConfigured(err.to_string()),
            CryptoError::InvalidEncoding(_) => Self::BadRequest(err.to_string()),
            CryptoError::InvalidKey(_)
            | CryptoError::VerificationFailed(_)
            | CryptoError::SigningFailed(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<VcError> for AppError {
    fn from(err: VcError) -> Self {
        match err {
            VcError::Crypto(e) => e.into(),
            VcError::InvalidInput(_)
            | VcError::InvalidController(_)
            | VcError::MalformedCredential(_)
            | VcError::Canonicalization(_) => Self::BadRequest(err.to_string()),
            VcError::Json(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<BakeError> for AppError {
    fn from(err: BakeError) -> Self {
        match err {
            BakeError::Credential(e) => e.into(),
            BakeError::Xml(_) | BakeError::NotSvg(_) | BakeError::Encoding(_) => {
                Self::BadRequest(err.to_string())
            }
            BakeError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::NotConfigured("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "NOT_CONFIGURED"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn key_mismatch_is_not_found() {
        let err: AppError = VcError::Crypto(CryptoError::KeyMismatch {
            requested: "key-deadbeef".into(),
        })
        .into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn client_input_errors_are_bad_request() {
        for err in [
            VcError::MalformedCredential("x".into()),
            VcError::InvalidController("x".into()),
            VcError::InvalidInput("x".into()),
        ] {
            assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
        }
        let bake: AppError = BakeError::NotSvg("root element is <html>".into()).into();
        assert!(matches!(bake, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn not_configured_message_is_shown() {
        let err: AppError = CryptoError::NotConfigured("RSA").into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "NOT_CONFIGURED");
        assert!(body.error.message.contains("not configured"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("rsa engine exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(!body.error.message.contains("rsa engine"));
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("badge not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.message.contains("badge not found"));
    }
}
