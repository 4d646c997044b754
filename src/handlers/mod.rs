pub mod redirect;
pub mod shorten;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorBody;

/// Failures surfaced to HTTP clients. Each carries only a fixed message; the
/// underlying cause is logged where the error is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    ShortenFailed,
    NotFound,
    RedirectFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ShortenFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to shorten URL"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Short URL not found"),
            ApiError::RedirectFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to redirect"),
        };

        let body = Json(ErrorBody {
            error: message.to_owned(),
        });

        (status, body).into_response()
    }
}
