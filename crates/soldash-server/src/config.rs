//! Server configuration from environment variables.

use std::env;
use std::time::Duration;

use soldash_core::PatternWindow;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8001;

/// Default provider timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Default notification log capacity.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 50;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Seconds to wait for the data provider before falling back.
    pub provider_timeout_secs: u64,
    /// Window whose hottest decile drives notifications.
    pub default_window: PatternWindow,
    /// Maximum number of retained notifications.
    pub notification_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            default_window: PatternWindow::Last10,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// All optional:
    /// - `PORT`: Server port (default: 8001)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `PROVIDER_TIMEOUT_SECS`: Provider timeout (default: 10)
    /// - `DEFAULT_WINDOW`: 10, 30 or 50 (default: 10)
    /// - `NOTIFICATION_CAPACITY`: Retained notifications (default: 50)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_allowed_origins);

        let provider_timeout_secs =
            parse_var(&lookup, "PROVIDER_TIMEOUT_SECS")?.unwrap_or(defaults.provider_timeout_secs);
        if provider_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PROVIDER_TIMEOUT_SECS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let default_window =
            parse_var(&lookup, "DEFAULT_WINDOW")?.unwrap_or(defaults.default_window);

        let notification_capacity =
            parse_var(&lookup, "NOTIFICATION_CAPACITY")?.unwrap_or(defaults.notification_capacity);
        if notification_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "NOTIFICATION_CAPACITY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            provider_timeout_secs,
            default_window,
            notification_capacity,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Provider timeout as a duration.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 8001);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cors_allowed_origins, "*");
        assert_eq!(config.provider_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_window, PatternWindow::Last10);
        assert_eq!(config.notification_capacity, 50);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("DEFAULT_WINDOW", "30"),
            ("NOTIFICATION_CAPACITY", "5"),
            ("PROVIDER_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.default_window, PatternWindow::Last30);
        assert_eq!(config.notification_capacity, 5);
        assert_eq!(config.provider_timeout_secs, 2);
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup(&[("DEFAULT_WINDOW", "20")])).unwrap_err();
        assert!(err.to_string().contains("DEFAULT_WINDOW"));

        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("NOTIFICATION_CAPACITY", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PROVIDER_TIMEOUT_SECS", "0")])).is_err());
    }
}
