//! Minimal bearer-token extractor (§1, §6): decodes a trusted-but-unverified
//! `Bearer <userId>` token. A stand-in for real JWT/session auth, which is
//! out of scope for this core.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// The authenticated user id, extracted from the `Authorization` header.
pub struct UserId(pub String);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(missing_token)?;

        let user_id = header
            .strip_prefix("Bearer ")
            .filter(|s| !s.is_empty())
            .ok_or_else(missing_token)?;

        Ok(UserId(user_id.to_owned()))
    }
}

fn missing_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "success": false,
            "error": "missing_bearer_token",
            "message": "Authorization: Bearer <userId> header is required",
        })),
    )
        .into_response()
}
