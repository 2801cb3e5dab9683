use std::str::FromStr;
use thiserror::Error;

/// Environment variable prefix for all settings
const ENV_PREFIX: &str = "APP_";

/// Application settings loaded from environment variables with defaults
#[derive(Debug, Clone)]
pub struct Settings {
    /// API listen host
    pub api_host: String,
    /// API listen port
    pub api_port: u16,
    /// Redis host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis database index
    pub redis_db: i64,
    /// Optional Redis password
    pub redis_password: Option<String>,
    /// Maximum number of pooled Redis connections
    pub redis_max_connections: usize,
    /// Whether to use SSL for the Redis connection
    pub redis_ssl: bool,
    /// Whether to target a Redis Cluster
    pub redis_cluster_enabled: bool,
    /// Comma-separated list of cluster nodes
    pub redis_cluster_nodes: String,
    /// Logging level (tracing EnvFilter directive)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_db: 0,
            redis_password: None,
            redis_max_connections: 10,
            redis_ssl: false,
            redis_cluster_enabled: false,
            redis_cluster_nodes: "localhost:7000,localhost:7001,localhost:7002".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from APP_-prefixed environment variables
    ///
    /// Every setting has a default; only malformed values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        Ok(Settings {
            api_host: env_string("API_HOST", defaults.api_host),
            api_port: env_parse("API_PORT", defaults.api_port)?,
            redis_host: env_string("REDIS_HOST", defaults.redis_host),
            redis_port: env_parse("REDIS_PORT", defaults.redis_port)?,
            redis_db: env_parse("REDIS_DB", defaults.redis_db)?,
            redis_password: env_optional("REDIS_PASSWORD"),
            redis_max_connections: env_parse(
                "REDIS_MAX_CONNECTIONS",
                defaults.redis_max_connections,
            )?,
            redis_ssl: env_flag("REDIS_SSL", defaults.redis_ssl),
            redis_cluster_enabled: env_flag("REDIS_CLUSTER_ENABLED", defaults.redis_cluster_enabled),
            redis_cluster_nodes: env_string("REDIS_CLUSTER_NODES", defaults.redis_cluster_nodes),
            log_level: env_string("LOG_LEVEL", defaults.log_level),
        })
    }

    /// Connection URL for the single-node store
    ///
    /// Cluster mode is recognized but rejected: there is no cluster code
    /// path in this build, and failing at startup beats failing on the
    /// first request.
    pub fn redis_url(&self) -> Result<String, ConfigError> {
        if self.redis_cluster_enabled {
            return Err(ConfigError::ClusterUnsupported {
                nodes: self.redis_cluster_nodes.clone(),
            });
        }

        let scheme = if self.redis_ssl { "rediss" } else { "redis" };
        let auth = match &self.redis_password {
            Some(password) => format!(":{}@", password),
            None => String::new(),
        };

        Ok(format!(
            "{}://{}{}:{}/{}",
            scheme, auth, self.redis_host, self.redis_port, self.redis_db
        ))
    }

    /// Socket address string for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

fn env_string(name: &str, default: String) -> String {
    env_var(name).unwrap_or(default)
}

fn env_optional(name: &str) -> Option<String> {
    env_var(name).filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env_var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: format!("{}{}", ENV_PREFIX, name),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env_var(name) {
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no" | ""
        ),
        None => default,
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for environment variable {name}")]
    InvalidEnvVar { name: String, value: String },

    #[error(
        "Redis cluster mode is enabled but not supported by this build; \
         unset APP_REDIS_CLUSTER_ENABLED (configured nodes: {nodes})"
    )]
    ClusterUnsupported { nodes: String },
}
