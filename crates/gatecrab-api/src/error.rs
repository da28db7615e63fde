use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatecrab_core::CoreError;
use gatecrab_github::GithubError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// GitHub API error
    Github(GithubError),

    /// Core logic error (bad policy configuration)
    Core(CoreError),

    /// Invalid request payload
    InvalidPayload(String),

    /// Invalid webhook signature (HMAC verification failed)
    InvalidSignature(String),

    /// Bad request (400)
    BadRequest(String),

    /// One or more PRs failed during a status-event fan-out
    FanOut { failed: usize },

    /// Internal server error
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Github(e) => write!(f, "GitHub error: {}", e),
            ApiError::Core(e) => write!(f, "Core error: {}", e),
            ApiError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            ApiError::InvalidSignature(msg) => write!(f, "Invalid signature: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::FanOut { failed } => write!(
                f,
                "{} PR(s) failed merge-readiness evaluation after status event",
                failed
            ),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Github(e) => Some(e),
            ApiError::Core(e) => Some(e),
            _ => None,
        }
    }
}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Github(_) => (StatusCode::INTERNAL_SERVER_ERROR, "github_error"),
            ApiError::Core(_) => (StatusCode::INTERNAL_SERVER_ERROR, "core_error"),
            ApiError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "invalid_payload"),
            ApiError::InvalidSignature(_) => (StatusCode::UNAUTHORIZED, "invalid_signature"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::FanOut { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "fanout_failed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

// Conversions from domain errors to ApiError
impl From<GithubError> for ApiError {
    fn from(e: GithubError) -> Self {
        match e {
            GithubError::InvalidSignature(msg) | GithubError::MissingHeader(msg) => {
                ApiError::InvalidSignature(msg)
            }
            other => ApiError::Github(other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidPayload(format!("JSON parsing error: {}", e))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
