use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use device_sim_api::shared::error::{error_codes, ErrorResponse};
use device_sim_api::shared::store::StoreError;

/// Main error type for the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("device '{0}' not found")]
    DeviceNotFound(String),

    #[error("device '{0}' is offline")]
    DeviceOffline(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Convert error to HTTP response with appropriate status code and error payload
    pub fn to_http_response(&self, request_id: &str) -> Response {
        let (status, error_code, message): (StatusCode, &str, String) = match self {
            ApiError::DeviceNotFound(device_id) => (
                StatusCode::NOT_FOUND,
                error_codes::DEVICE_NOT_FOUND,
                format!("Device with ID '{}' not found", device_id),
            ),
            ApiError::DeviceOffline(device_id) => (
                StatusCode::BAD_REQUEST,
                error_codes::DEVICE_OFFLINE,
                format!("Device '{}' is offline. Cannot send command.", device_id),
            ),
            ApiError::InvalidCommand(detail) => (
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_COMMAND,
                format!("Invalid command structure: {}", detail),
            ),
            ApiError::Store(StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::STORE_UNAVAILABLE,
                "Error communicating with data store.".to_string(),
            ),
            ApiError::Store(StoreError::InvalidRecord { device_id, .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INVALID_RECORD,
                format!("Stored record for device '{}' failed validation", device_id),
            ),
            ApiError::Store(StoreError::Serialization(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "An unexpected error occurred.".to_string(),
            ),
        };

        (
            status,
            Json(ErrorResponse::new(error_code, message, request_id)),
        )
            .into_response()
    }
}
