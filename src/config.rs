/// Configuration management for the Graylog mock server
use crate::error::{MockError, MockResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Prefix every route is mounted under; empty mounts at the root
    pub base_path: String,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file; state is kept in memory only when unset
    pub data_path: Option<PathBuf>,
    pub write_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl StorageConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 8000,
                base_path: "/api".to_string(),
            },
            storage: StorageConfig {
                data_path: None,
                write_timeout_ms: 5000,
            },
            logging: LoggingConfig {
                level: "graylog_mock=info,tower_http=info".to_string(),
                json: false,
            },
        }
    }
}

/// Strip trailing slashes and make sure a non-empty prefix starts with one
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Parse an optional numeric setting, falling back to `default` when unset
fn parse_number<T: FromStr>(raw: Option<String>, default: T, message: &str) -> MockResult<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| MockError::Validation(format!("{}: {:?}", message, value))),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> MockResult<Self> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let hostname = env::var("GRAYLOG_MOCK_HOSTNAME").unwrap_or(defaults.service.hostname);
        let port = parse_number(
            env::var("GRAYLOG_MOCK_PORT").ok(),
            defaults.service.port,
            "Invalid port number",
        )?;
        let base_path = env::var("GRAYLOG_MOCK_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or(defaults.service.base_path);

        let data_path = env::var("GRAYLOG_MOCK_DATA_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        let write_timeout_ms = parse_number(
            env::var("GRAYLOG_MOCK_WRITE_TIMEOUT_MS").ok(),
            defaults.storage.write_timeout_ms,
            "Invalid write timeout",
        )?;

        let level = env::var("RUST_LOG").unwrap_or(defaults.logging.level);
        let json = env::var("GRAYLOG_MOCK_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                base_path,
            },
            storage: StorageConfig {
                data_path,
                write_timeout_ms,
            },
            logging: LoggingConfig { level, json },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> MockResult<()> {
        if self.service.hostname.is_empty() {
            return Err(MockError::Validation("Hostname cannot be empty".to_string()));
        }

        if !self.service.base_path.is_empty() && !self.service.base_path.starts_with('/') {
            return Err(MockError::Validation(
                "Base path must start with '/'".to_string(),
            ));
        }

        if self.storage.write_timeout_ms == 0 {
            return Err(MockError::Validation(
                "Write timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.service.base_path, "/api");
        assert_eq!(config.storage.write_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/api/"), "/api");
        assert_eq!(normalize_base_path("api"), "/api");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(None, 5000u64, "Invalid write timeout").unwrap(), 5000);
        assert_eq!(parse_number(Some("250".to_string()), 5000u64, "x").unwrap(), 250);

        let err = parse_number(Some("5s".to_string()), 5000u64, "Invalid write timeout").unwrap_err();
        assert!(matches!(err, MockError::Validation(ref message) if message.starts_with("Invalid write timeout")));
        assert!(parse_number::<u16>(Some("70000".to_string()), 9000, "Invalid port number").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.storage.write_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.service.base_path = "api".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.service.hostname = String::new();
        assert!(config.validate().is_err());
    }
}
