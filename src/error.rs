// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::resources::ServiceError;

/// HTTP API error rendered as `{ error, details? }`
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, details: Option<String> },
    InvalidJson(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError { message: String, details: Option<String> },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::InvalidJson(_) => "Invalid JSON body",
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { details, .. } => details.as_deref(),
            ApiError::InvalidJson(details) => Some(details),
            ApiError::InternalServerError { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({ "error": self.message() });
        if let Some(details) = self.details() {
            response["details"] = json!(details);
        }
        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), details: None }
    }

    pub fn bad_request_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), details: Some(details.into()) }
    }

    pub fn invalid_json(details: impl Into<String>) -> Self {
        ApiError::InvalidJson(details.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::InternalServerError { message: message.into(), details: Some(details.into()) }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidIdentity { resource, details } => {
                ApiError::bad_request_with_details(format!("Invalid {} id", resource), details)
            }
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::ValidationFailed(msg) => ApiError::bad_request(msg),
            ServiceError::StoreFailure { context, source } => {
                ApiError::internal_server_error(context, source.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
