use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use device_sim_api::shared::directory;
use device_sim_api::shared::domain::Device;

use crate::error::ApiError;
use crate::router::{new_request_id, AppState};

/// Handler for GET /devices
///
/// Lists all decodable devices. Individually invalid records are skipped
/// by the directory; an empty store yields an empty array, not an error.
pub async fn list_devices(State(state): State<AppState>) -> Response {
    let request_id = new_request_id();
    info!(request_id = %request_id, "Processing list devices request");

    match try_list_devices(&state).await {
        Ok(devices) => {
            info!(
                request_id = %request_id,
                count = devices.len(),
                "Listed devices"
            );
            (StatusCode::OK, Json(devices)).into_response()
        }
        Err(err) => {
            error!(request_id = %request_id, error = %err, "Failed to list devices");
            err.to_http_response(&request_id)
        }
    }
}

async fn try_list_devices(state: &AppState) -> Result<Vec<Device>, ApiError> {
    let mut conn = state.store.get_connection().await?;
    Ok(directory::list_devices(&mut conn).await?)
}

/// Handler for GET /devices/{id}
///
/// Returns the device or 404. Unlike the bulk listing, an undecodable
/// record here surfaces as a server-side data error.
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Response {
    let request_id = new_request_id();
    info!(
        request_id = %request_id,
        device_id = %device_id,
        "Processing get device request"
    );

    match try_get_device(&state, &device_id).await {
        Ok(device) => (StatusCode::OK, Json(device)).into_response(),
        Err(err) => {
            error!(
                request_id = %request_id,
                device_id = %device_id,
                error = %err,
                "Failed to get device"
            );
            err.to_http_response(&request_id)
        }
    }
}

async fn try_get_device(state: &AppState, device_id: &str) -> Result<Device, ApiError> {
    let mut conn = state.store.get_connection().await?;
    directory::get_device(&mut conn, device_id)
        .await?
        .ok_or_else(|| ApiError::DeviceNotFound(device_id.to_string()))
}
