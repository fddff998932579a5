//! Discount API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                  | Default     |
//! |---------------------------|-------------|
//! | `VELA_HTTP_PORT`          | `8080`      |
//! | `VELA_BIND_ADDR`          | `0.0.0.0`   |
//! | `VELA_DB_PATH`            | `./vela.db` |
//! | `VELA_DB_MAX_CONNECTIONS` | `5`         |
//! | `VELA_CATALOG_TIMEOUT_MS` | `2000`      |

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Discount API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite catalog file
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Upper bound on each catalog read; past it the catalog counts as unavailable
    pub catalog_timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            http_port: var("VELA_HTTP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VELA_HTTP_PORT".to_string()))?,

            bind_addr: var("VELA_BIND_ADDR", "0.0.0.0"),

            db_path: var("VELA_DB_PATH", "./vela.db"),

            db_max_connections: var("VELA_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VELA_DB_MAX_CONNECTIONS".to_string()))?,

            catalog_timeout: var("VELA_CATALOG_TIMEOUT_MS", "2000")
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue("VELA_CATALOG_TIMEOUT_MS".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("VELA_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.catalog_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("VELA_CATALOG_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// Address the HTTP server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("VELA_BIND_ADDR".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_path, "./vela.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.catalog_timeout, Duration::from_millis(2000));
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("VELA_HTTP_PORT", "9000"),
            ("VELA_BIND_ADDR", "127.0.0.1"),
            ("VELA_CATALOG_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.catalog_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("VELA_HTTP_PORT", "http")]),
            Err(ConfigError::InvalidValue(key)) if key == "VELA_HTTP_PORT"
        ));
        assert!(load(&[("VELA_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("VELA_CATALOG_TIMEOUT_MS", "0")]).is_err());
        assert!(load(&[("VELA_BIND_ADDR", "not an ip")])
            .unwrap()
            .socket_addr()
            .is_err());
    }
}
