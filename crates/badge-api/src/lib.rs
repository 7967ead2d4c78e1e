//! # badge-api — Axum HTTP Surface for the Badge Engine
//!
//! Publishes the issuer's keys and profile, issues signed badges, serves
//! them baked into SVG, and verifies them. Every URL in a response is
//! derived from the request's issuer origin (`ISSUER_BASE_URL`, or the
//! `Host` header when unset).
//!
//! ## API Surface
//!
//! | Route                                  | Module               | Auth   |
//! |----------------------------------------|----------------------|--------|
//! | `GET /.well-known/jwks.json`           | [`routes::keys`]     | public |
//! | `GET /api/badge/issuer/keys/:key_id`   | [`routes::keys`]     | public |
//! | `GET /api/badge/issuer`                | [`routes::issuer`]   | public |
//! | `POST /api/badge`                      | [`routes::badges`]   | bearer |
//! | `GET /api/badge/:badge_id/json`        | [`routes::badges`]   | public |
//! | `GET /api/badge/:badge_id/verify`      | [`routes::badges`]   | public |
//! | `GET /api/badge/:badge_id/image`       | [`routes::badges`]   | public |
//! | `GET /api/badge/:badge_id/download`    | [`routes::badges`]   | public |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware (issuance only) → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the trace layer and
/// need no credentials; only issuance is authenticated.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let issuance = routes::badges::issue_router()
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    let api = Router::new()
        .merge(routes::keys::router())
        .merge(routes::issuer::router())
        .merge(routes::badges::router())
        .merge(issuance)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. Missing keys do not make the service unready; the
/// endpoints needing them answer `NOT_CONFIGURED` instead.
async fn readiness() -> &'static str {
    "ready"
}
