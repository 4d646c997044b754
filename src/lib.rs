use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod expiry;
pub mod handlers;
pub mod models;
pub mod service;
pub mod shortcode;

use service::MappingService;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub service: MappingService,
}

impl AppState {
    pub fn new(service: MappingService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .route("/shorten", post(handlers::shorten::shorten))
        // Short-link redirect; the static paths above win over the capture
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
