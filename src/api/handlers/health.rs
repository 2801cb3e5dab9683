use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use device_sim_api::shared::store::StoreHealth;

use crate::router::{new_request_id, AppState};

/// Response payload for GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub application_status: &'static str,
    pub store_status: StoreHealth,
    pub timestamp: DateTime<Utc>,
}

/// Handler for GET /health
///
/// Always 200: store trouble degrades `store_status` instead of failing
/// the response. Process liveness and store reachability are reported
/// independently.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let request_id = new_request_id();

    let store_status = state.store.check_health().await;
    if store_status != StoreHealth::Healthy {
        warn!(
            request_id = %request_id,
            store_status = ?store_status,
            "Health check: store degraded"
        );
    }

    let body = HealthResponse {
        application_status: "healthy",
        store_status,
        timestamp: state.clock.now_utc(),
    };

    (StatusCode::OK, Json(body)).into_response()
}
