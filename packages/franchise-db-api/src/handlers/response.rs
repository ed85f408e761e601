//! JSON envelope shared by every endpoint.
//!
//! Success: `{"success": true, "data": ...}`.
//! Failure: `{"success": false, "error": {"code", "message", "details"}}`.

use serde::Serialize;

use crate::router::RouterError;

/// Envelope for successful responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Error payload of a failed response
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// HTTP status code as a string
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Machine-readable failure name, e.g. `ForeignKeyNotFound`
    pub details: Option<String>,
}

/// Envelope for failed responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

/// Wraps `data` in a success envelope.
pub fn success_response<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// Builds a failure envelope for `status`.
pub fn error_response(status: u16, message: String, details: Option<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: ApiError {
            code: status.to_string(),
            message,
            details,
        },
    }
}

/// Serializes `data` inside a success envelope.
pub fn success_json<T: Serialize>(data: T) -> Result<Vec<u8>, RouterError> {
    serde_json::to_vec(&success_response(data))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))
}
