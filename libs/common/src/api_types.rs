//! Shared API models for the alerting services
//!
//! Unified request/response envelopes so every endpoint answers in the
//! same shape regardless of which service handles it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// ============================================================================
// Standard API Response Models
// ============================================================================

/// Standard success response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SuccessResponse<T> {
    /// Success indicator (always true)
    #[serde(default = "crate::serde_helpers::bool_true")]
    pub success: bool,
    /// Response data
    pub data: T,
    /// Additional metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> SuccessResponse<T> {
    /// Create a new success response
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the response
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    /// Success indicator (always false for errors)
    #[serde(default = "crate::serde_helpers::bool_false")]
    pub success: bool,
    /// Error information
    pub error: ErrorInfo,
}

/// Standard error information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorInfo {
    /// Error code (HTTP status or custom)
    pub code: u16,
    /// Error message
    pub message: String,
    /// Detailed error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorInfo {
    /// Create a new error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
            details: None,
        }
    }

    /// Create with specific code
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Add details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// ============================================================================
// AppError - HTTP Error with proper status codes (requires axum feature)
// ============================================================================

#[cfg(feature = "axum")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Application error with HTTP status code
///
/// Implements `IntoResponse` so handlers can return `Result<_, AppError>`
/// and get a consistent JSON error body.
#[cfg(feature = "axum")]
#[derive(Debug, Clone)]
pub struct AppError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error information
    pub error: ErrorInfo,
}

#[cfg(feature = "axum")]
impl AppError {
    /// Create a new error
    pub fn new(status: StatusCode, error: ErrorInfo) -> Self {
        Self { status, error }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ErrorInfo::new(message).with_code(400),
        }
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ErrorInfo::new(message).with_code(404),
        }
    }

    /// Create a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            error: ErrorInfo::new(message).with_code(409),
        }
    }

    /// Create a 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ErrorInfo::new(message).with_code(500),
        }
    }

    /// Create a 503 Service Unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: ErrorInfo::new(message).with_code(503),
        }
    }

    /// Add details to the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.error = self.error.with_details(details);
        self
    }
}

#[cfg(feature = "axum")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.error,
            }),
        )
            .into_response()
    }
}

#[cfg(feature = "axum")]
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_error(err.to_string())
    }
}

// ============================================================================
// Service Health & Status Models
// ============================================================================

/// Service status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_success_response_creation() {
        let response = SuccessResponse::new("test data");
        assert_eq!(response.data, "test data");
        assert!(response.metadata.is_empty());

        let response_with_metadata =
            SuccessResponse::new("test").with_metadata("key", serde_json::json!("value"));
        assert_eq!(response_with_metadata.metadata.len(), 1);
    }

    #[test]
    fn test_error_response_creation() {
        let error = ErrorInfo::new("Something went wrong").with_code(500);
        let response = ErrorResponse {
            success: false,
            error,
        };
        assert_eq!(response.error.message, "Something went wrong");
        assert_eq!(response.error.code, 500);
        assert!(!response.success);
    }

    #[test]
    fn test_error_info_details() {
        let error = ErrorInfo::new("placement failed")
            .with_code(502)
            .with_details("provider returned 401");
        assert_eq!(error.code, 502);
        assert_eq!(error.details.as_deref(), Some("provider returned 401"));
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_app_error_constructors() {
        let err = AppError::not_found("no such alert");
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.error.code, 404);

        let err = AppError::conflict("alert already recorded").with_details("use a fresh id");
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
        assert!(err.error.details.is_some());
    }

    #[test]
    fn test_success_response_serialization() {
        let response = SuccessResponse::new(serde_json::json!({"alert_id": "a_b_1"}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("alert_id"));
    }
}
