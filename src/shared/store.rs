use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// How long a request may wait for a pooled connection before failing fast
const POOL_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Store-level failure classes
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity, pool exhaustion, or command transport failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data failed validation (data corruption class)
    #[error("invalid device record for '{device_id}': {reason}")]
    InvalidRecord { device_id: String, reason: String },

    /// A value could not be serialized for storage
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Reachability of the backing store, reported by GET /health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreHealth {
    Healthy,
    Unhealthy,
    Unavailable,
}

/// Redis store handle with a bounded connection pool
///
/// Explicitly constructed at startup and passed to handlers through
/// application state; owns the connect/ping/close lifecycle. Cloning is
/// cheap and shares the pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create a store handle with a bounded connection pool
    ///
    /// The pool is lazy: connections are established on first use, so this
    /// succeeds even while the store is down. Requests beyond
    /// `max_connections` queue up to the wait timeout and then fail with
    /// `StoreError::Unavailable` instead of blocking indefinitely.
    ///
    /// # Arguments
    /// * `url` - Connection URL (`redis://...` or `rediss://...`)
    /// * `max_connections` - Maximum number of pooled connections
    pub fn connect(url: &str, max_connections: usize) -> Result<Self, StoreError> {
        let mut cfg = Config::from_url(url);

        let mut pool_cfg = PoolConfig::new(max_connections);
        pool_cfg.timeouts.wait = Some(POOL_WAIT_TIMEOUT);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Unavailable(format!("failed to create pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Borrow a connection from the pool for the duration of one request
    ///
    /// The connection returns to the pool when dropped, on every exit path.
    pub async fn get_connection(&self) -> Result<Connection, StoreError> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip PING to verify connectivity
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(reply = %reply, "Store ping successful");
        Ok(())
    }

    /// Classify store reachability for the health endpoint
    ///
    /// `Unavailable` when no connection can be obtained from the pool,
    /// `Unhealthy` when a connection exists but PING fails.
    pub async fn check_health(&self) -> StoreHealth {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(_) => return StoreHealth::Unavailable,
        };

        let reply: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(_) => StoreHealth::Healthy,
            Err(_) => StoreHealth::Unhealthy,
        }
    }

    /// Close the pool, disconnecting all idle connections
    pub fn close(&self) {
        self.pool.close();
    }
}
