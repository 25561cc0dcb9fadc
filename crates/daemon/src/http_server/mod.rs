use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::Router;
use http::header::{COOKIE, SET_COOKIE};
use tokio::sync::watch;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

use common::verify::LETTERS_PREFIX;

pub mod api;
pub mod auth;
mod config;
mod handlers;
mod health;
mod html;
pub mod rate_limit;

pub use config::Config;

use crate::ServiceState;

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

/// Largest request body accepted anywhere (verification bodies are tiny)
pub const MAX_BODY_SIZE_BYTES: usize = 16 * 1024;

/// Build the full application router.
///
/// Everything outside `/_status`, `/api` and `/letters` is served from
/// `config.public_dir` when one is configured.
pub fn router(config: &Config, state: ServiceState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .nest(LETTERS_PREFIX, html::router(state.clone()));

    let router = match &config.public_dir {
        Some(public_dir) => {
            tracing::info!(dir = %public_dir.display(), "serving public assets");
            router.fallback_service(
                ServeDir::new(public_dir)
                    .not_found_service(handlers::not_found_handler.into_service()),
            )
        }
        None => router.fallback(handlers::not_found_handler),
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .with_state(state)
        .layer(trace_layer)
        .layer(SetSensitiveHeadersLayer::new([COOKIE, SET_COOKIE]))
}

/// Run the HTTP server until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state);

    tracing::info!(addr = ?listen_addr, "HTTP server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    // peer addresses key the verification rate limiter
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    })
    .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
