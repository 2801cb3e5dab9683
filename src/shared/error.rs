use serde::{Deserialize, Serialize};

/// Standard error response payload
/// Contains stable machine-readable error code, human-readable message, and request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "DEVICE_OFFLINE")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for tracing and debugging
    pub request_id: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Machine-readable error codes used across the API
pub mod error_codes {
    // Not found errors
    pub const DEVICE_NOT_FOUND: &str = "DEVICE_NOT_FOUND";
    pub const ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";

    // Client errors
    pub const DEVICE_OFFLINE: &str = "DEVICE_OFFLINE";
    pub const INVALID_COMMAND: &str = "INVALID_COMMAND";

    // Store errors
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const INVALID_RECORD: &str = "INVALID_RECORD";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
