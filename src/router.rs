use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use uuid::Uuid;

use device_sim_api::shared::store::RedisStore;
use device_sim_api::shared::time::Clock;

use crate::handlers;

/// Shared application state handed to every handler
///
/// The store handle and clock are constructed once at startup and injected
/// here; nothing in the request path reaches for process-global state.
#[derive(Clone)]
pub struct AppState {
    pub store: RedisStore,
    pub clock: Arc<dyn Clock>,
}

/// Assemble the HTTP surface
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/devices", get(handlers::devices::list_devices))
        .route("/devices/:device_id", get(handlers::devices::get_device))
        .route(
            "/devices/:device_id/command",
            post(handlers::commands::send_command),
        )
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Fresh request id for log correlation and error payloads
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = new_request_id();
        let b = new_request_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
