//! Error types for the admin API.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use masthead_core::api::ErrorBody;
use thiserror::Error;

/// Errors returned from request handling.
///
/// Messages never say which secret component was wrong.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No role matched the presented token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The resolved role is not on the endpoint's allow-list.
    #[error("Forbidden")]
    Forbidden,

    /// The debug endpoint was called outside development.
    #[error("This API is only available in development")]
    DebugDisabled,

    /// A required `token` parameter was absent.
    #[error("Token parameter is required")]
    MissingToken,

    /// The client exceeded its request budget.
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    /// Internal error.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::DebugDisabled => StatusCode::FORBIDDEN,
            ApiError::MissingToken => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = ErrorBody::new(self.to_string());
        let retry_after = match &self {
            ApiError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };
        body.retry_after = retry_after;

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Errors that prevent the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listener.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// The server loop terminated with an error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
