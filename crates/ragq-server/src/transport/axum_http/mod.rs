//! Axum transport: router assembly and the HTTP-facing DTOs/extractors.

mod auth;
mod dto;
mod errors;
mod handlers;
mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the full `/api/rag/*` router over a shared [`AppState`].
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/rag/ask", post(handlers::ask))
        .route("/api/rag/ask-sync", post(handlers::ask_sync))
        .route("/api/rag/ask-file/:fileId", post(handlers::ask_file))
        .route("/api/rag/status/:jobId", get(handlers::status))
        .route("/api/rag/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
