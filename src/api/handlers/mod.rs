pub mod commands;
pub mod devices;
pub mod health;

use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use device_sim_api::shared::error::{error_codes, ErrorResponse};

use crate::router::new_request_id;

/// Structured 404 for routes outside the API surface
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let request_id = new_request_id();

    warn!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Unknown route"
    );

    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            error_codes::ROUTE_NOT_FOUND,
            format!("Route {} {} not found", method, uri.path()),
            request_id,
        )),
    )
        .into_response()
}
