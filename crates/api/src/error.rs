use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use folio_publish::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses: admission refusals (rate limit, quota, validation) carry
/// their own structured payloads, everything else uses the flat
/// `{"error": ..., "code": ...}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain-level error from the publishing pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The gateway identity headers are missing or malformed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Pipeline(err) => return pipeline_response(err),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        };

        envelope(status, code, message)
    }
}

/// Map a pipeline error onto its HTTP response.
///
/// - Rate limit and quota refusals return 429 with the structured
///   payloads the editor renders (plus a `Retry-After` header for the
///   sliding-window case).
/// - Gate failures return 422 with the full validation report.
/// - Store and internal failures are logged and sanitized to a generic
///   500; the alert sink already captured the detail.
fn pipeline_response(err: PipelineError) -> Response {
    match err {
        PipelineError::RateLimited {
            limit,
            retry_after_secs,
            ..
        } => {
            let body = json!({
                "code": "rate-limit-exceeded",
                "retryAfterSeconds": retry_after_secs,
                "limit": limit,
            });
            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.max(0).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }

        PipelineError::QuotaExceeded {
            limit, reset_at, ..
        } => {
            let body = json!({
                "code": "quota-exceeded",
                "resetAt": reset_at,
                "limit": limit,
            });
            (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response()
        }

        PipelineError::ValidationFailed(report) => {
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(report)).into_response()
        }

        PipelineError::NotFound { entity, id } => envelope(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),

        PipelineError::Forbidden(msg) => envelope(StatusCode::FORBIDDEN, "FORBIDDEN", msg),

        PipelineError::Conflict(msg) => envelope(StatusCode::CONFLICT, "CONFLICT", msg),

        PipelineError::Store(store_err) => {
            tracing::error!(error = %store_err, "Content store error");
            envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }

        PipelineError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal pipeline error");
            envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Build the flat `{"error": ..., "code": ...}` JSON error response.
fn envelope(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = json!({
        "error": message,
        "code": code,
    });

    (status, axum::Json(body)).into_response()
}
