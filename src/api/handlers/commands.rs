use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use device_sim_api::shared::command_log;
use device_sim_api::shared::directory;
use device_sim_api::shared::domain::{CommandEntry, CommandRequest, CommandResponse};

use crate::error::ApiError;
use crate::router::{new_request_id, AppState};

/// Handler for POST /devices/{id}/command
///
/// Validates the body before any store access, checks the device exists
/// and is online, then appends the entry to the bounded history log and
/// returns a receipt carrying the server-generated timestamp.
pub async fn send_command(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let request_id = new_request_id();
    info!(
        request_id = %request_id,
        device_id = %device_id,
        "Processing send command request"
    );

    match try_send_command(&state, &device_id, &body).await {
        Ok(receipt) => {
            info!(
                request_id = %request_id,
                device_id = %device_id,
                action = %receipt.action_performed,
                "Command logged"
            );
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(err) => {
            error!(
                request_id = %request_id,
                device_id = %device_id,
                error = %err,
                "Failed to send command"
            );
            err.to_http_response(&request_id)
        }
    }
}

/// Parse and validate a raw request body into a CommandRequest
pub(crate) fn parse_command_request(body: &[u8]) -> Result<CommandRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidCommand(e.to_string()))
}

async fn try_send_command(
    state: &AppState,
    device_id: &str,
    body: &[u8],
) -> Result<CommandResponse, ApiError> {
    let command = parse_command_request(body)?;

    let mut conn = state.store.get_connection().await?;

    let device = directory::get_device(&mut conn, device_id)
        .await?
        .ok_or_else(|| ApiError::DeviceNotFound(device_id.to_string()))?;

    if !device.online {
        return Err(ApiError::DeviceOffline(device_id.to_string()));
    }

    let timestamp = state.clock.now_utc();
    let entry = CommandEntry {
        action: command.action.clone(),
        parameters: command.parameters,
        timestamp,
    };

    command_log::append_command(&mut conn, device_id, &entry).await?;

    Ok(CommandResponse {
        message: "Command received, processed, and logged successfully.".to_string(),
        device_id: device_id.to_string(),
        action_performed: command.action,
        timestamp,
    })
}
