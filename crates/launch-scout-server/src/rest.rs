// Copyright 2026 Launch Scout Contributors
// SPDX-License-Identifier: MIT

//! HTTP REST API.
//!
//! Every scrape request opens its own document through the shared
//! [`DocumentSource`], so concurrent requests never share a page.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use launch_scout::{scan, DocumentSource, ResponseBody, ScanConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by all handlers.
pub struct AppState {
    pub source: Arc<dyn DocumentSource>,
    pub config: ScanConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(source: Arc<dyn DocumentSource>, config: ScanConfig) -> Self {
        Self {
            source,
            config,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/scrape-new-games", get(scrape_new_games))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
        })
        .await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn index() -> &'static str {
    "Launch Scout API running"
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "active_documents": state.source.active_documents(),
        "profile": state.config.profile,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn scrape_new_games(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    info!("starting scrape");
    let result = scan(state.source.as_ref(), &state.config).await;
    into_http(result.into())
}

fn into_http(resp: ResponseBody) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(resp.body))
}
