use crate::{handlers::ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// 1. Rebuild the full short URL as prefix + code.
/// 2. Look up the live mapping.
/// 3. Answer 302 with the destination in `Location`, or 404 when unknown.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let short_url = state.service.generator().short_url_for(&code);

    let original_url = match state.service.resolve(&short_url).await {
        Ok(Some(url)) => url,
        Ok(None) => return Err(ApiError::NotFound),
        Err(e) => {
            tracing::error!("Lookup of '{}' failed: {} (cause: {:?})", short_url, e, e.source);
            return Err(ApiError::RedirectFailed);
        }
    };

    let location = HeaderValue::try_from(original_url.as_str()).map_err(|e| {
        tracing::error!(
            "Destination of '{}' is not a valid Location header: {:?}",
            short_url,
            e
        );
        ApiError::RedirectFailed
    })?;

    tracing::debug!("Redirecting '{}' to {}", short_url, original_url);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
