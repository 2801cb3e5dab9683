// API server binary entry point

mod config;
mod error;
mod router;

// Handlers module
#[path = "api/handlers/mod.rs"]
mod handlers;

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Settings;
use device_sim_api::shared::store::RedisStore;
use device_sim_api::shared::time::SystemClock;
use router::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    info!(
        host = %settings.redis_host,
        port = settings.redis_port,
        db = settings.redis_db,
        max_connections = settings.redis_max_connections,
        "Initializing Redis connection pool"
    );

    let store = RedisStore::connect(&settings.redis_url()?, settings.redis_max_connections)?;

    // The service starts even when the store is down: requests answer 503
    // and /health reports the degraded state until it comes back.
    match store.ping().await {
        Ok(()) => info!("Redis connection pool initialized and tested"),
        Err(err) => error!(
            error = %err,
            "Redis unreachable at startup; continuing degraded"
        ),
    }

    let state = AppState {
        store: store.clone(),
        clock: Arc::new(SystemClock::new()),
    };

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "API server listening");

    axum::serve(listener, router::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown: closing Redis connection pool");
    store.close();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to install shutdown signal handler");
    }
}
