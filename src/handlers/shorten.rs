use crate::{
    handlers::ApiError,
    models::{ShortenRequest, ShortenResponse},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /shorten
///
/// Body `{ "originalUrl": "..." }`. The URL is stored as given, without any
/// format check. Any failure (unreadable body, missing URL, storage error or
/// code collision) is answered with the same 500 payload.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::error!("Rejected shorten body: {}", e);
        ApiError::ShortenFailed
    })?;

    let original_url = req.original_url();
    match state.service.shorten(&original_url).await {
        Ok(short_url) => Ok(Json(ShortenResponse { short_url })),
        Err(e) => {
            tracing::error!(
                kind = ?e.kind,
                "Failed to shorten '{}': {} (cause: {:?})",
                original_url,
                e,
                e.source
            );
            Err(ApiError::ShortenFailed)
        }
    }
}
