//! Response types for the daemon protocol.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A response from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded.
    pub success: bool,

    /// Unique identifier for this request/response pair.
    pub request_id: Uuid,

    /// Response data on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error details on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

/// Error details in a response.
///
/// The code is the stable, machine-checkable part; the message is diagnostic
/// text and makes no stability promise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "VALIDATION_ERROR", "PATH_FORBIDDEN").
    pub code: String,

    /// Human-readable error message.
    pub message: String,

    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Response {
    /// Create a success response with a specific request ID.
    pub fn success_with_id(request_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            success: true,
            request_id,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with a specific request ID.
    pub fn error_with_id(
        request_id: Uuid,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            request_id,
            data: None,
            error: Some(ErrorResponse {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
        }
    }

    /// Create an error response with no correlated request.
    ///
    /// Used when the failure happens before a request could be parsed.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::error_with_id(Uuid::new_v4(), code, message)
    }
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response =
            Response::success_with_id(Uuid::new_v4(), serde_json::json!({"result": "ok"}));
        assert!(response.success);
        assert!(response.data.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_error_response() {
        let response = Response::error("VALIDATION_ERROR", "Invalid unit name: bad;name");
        assert!(!response.success);
        assert!(response.data.is_none());

        let error = response.error.unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("bad;name"));
    }

    #[test]
    fn test_response_serialization() {
        let response = Response::success_with_id(Uuid::new_v4(), serde_json::json!({"key": "value"}));
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"request_id\""));
        assert!(!json.contains("\"error\"")); // Should be skipped when None
    }
}
