use std::time::{Duration, UNIX_EPOCH};

use axum::Json;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::rate_limit::RateLimitRejection;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed request: {0}")]
    BadRequest(String),

    /// The query failed the meaningfulness gate.
    #[error("Topic query is too short or not meaningful")]
    NotMeaningful { normalized: String },

    #[error(transparent)]
    RateLimited(#[from] RateLimitRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(_) => {
                let body = json!({ "error": self.to_string() });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::NotMeaningful { ref normalized } => {
                let body = json!({
                    "error": self.to_string(),
                    "normalized": normalized,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            Self::RateLimited(rejection) => {
                let body = json!({
                    "error": rejection.to_string(),
                    "scope": rejection.scope,
                    "retry_at": rejection.reset_at,
                });
                let mut headers = HeaderMap::new();
                headers.insert("x-ratelimit-reset", HeaderValue::from(rejection.reset_at));
                let retry_at = UNIX_EPOCH + Duration::from_millis(rejection.reset_at);
                if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(retry_at)) {
                    headers.insert(header::RETRY_AFTER, value);
                }
                (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
            }
        }
    }
}
