//! Translates the domain error taxonomy into the JSON error envelope
//! `{success:false, message, error, requestId?}` (§7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ragq_domain::error::Error;
use serde::Serialize;

/// Newtype so this crate can implement `IntoResponse` for the domain error
/// without violating the orphan rule.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: String,
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::UnavailableQueue { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UnavailableEmbed { .. }
            | Error::UnavailableVector { .. }
            | Error::UnavailableLlm { .. }
            | Error::Timeout { .. }
            | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorEnvelope {
            success: false,
            message: self.0.to_string(),
            error: self.0.code(),
        };

        (status, Json(body)).into_response()
    }
}
