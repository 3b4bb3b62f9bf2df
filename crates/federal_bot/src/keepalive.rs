//! Keep-alive HTTP endpoint for hosts that probe the process over HTTP.

use axum::{Json, Router, extract::State, routing::get};
use federal_error::{PlatformError, PlatformResult};
use serde::Serialize;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy)]
struct KeepAlive {
    started: Instant,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

/// Routes: `GET /` answers with a plain-text banner, `GET /health` with the
/// bot's name, version and uptime as JSON.
pub fn router() -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .with_state(KeepAlive {
            started: Instant::now(),
        })
}

async fn banner() -> &'static str {
    "Bot está online!"
}

async fn health(State(keepalive): State<KeepAlive>) -> Json<Health> {
    Json(Health {
        status: "online",
        service: "federal-bot",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: keepalive.started.elapsed().as_secs(),
    })
}

/// Serve the keep-alive routes on `0.0.0.0:port` until the process exits.
#[instrument]
pub async fn serve(port: u16) -> PlatformResult<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| PlatformError::new("keepalive_bind", e.to_string()))?;
    info!(%port, "Keep-alive endpoint listening");
    axum::serve(listener, router())
        .await
        .map_err(|e| PlatformError::new("keepalive_serve", e.to_string()))
}
