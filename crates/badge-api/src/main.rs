//! # badge-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment;
//! see [`AppConfig::from_lookup`] for the variables read.

use badge_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;

    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; badge issuance is unauthenticated");
    }
    match &config.issuer_origin {
        Some(origin) => tracing::info!(issuer = %origin.issuer_profile_url(), "issuer origin fixed by ISSUER_BASE_URL"),
        None => tracing::info!("issuer origin derived from each request's Host header"),
    }

    let port = config.port;
    let state = AppState::with_config(config);
    let app = badge_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Badge API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
