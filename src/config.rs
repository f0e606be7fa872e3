//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_SEASON_LENGTH_DAYS, DEFAULT_SEASON_NAME,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TOKEN_LEEWAY_SECONDS,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Persistence backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store, state lost on shutdown (local/simulated deployments)
    Memory,
    /// Remote document store backed by Postgres
    Postgres,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    pub season: SeasonConfig,
    pub mirror: MirrorConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Identity token verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub leeway_seconds: u64,
}

/// Administrator identity configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// The one reserved administrator email address
    pub email: String,
}

/// Season defaults used when no settings record exists yet
#[derive(Debug, Clone)]
pub struct SeasonConfig {
    pub default_name: String,
    pub default_length_days: i64,
    pub default_active: bool,
}

/// Spreadsheet mirror configuration
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// HTTP endpoint receiving mirror pushes; mirroring is disabled when unset
    pub url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig::from_env()?,
            store: StoreConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            season: SeasonConfig::from_env()?,
            mirror: MirrorConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL".to_string()));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres,
            _ => return Err(ConfigError::InvalidValue("STORE_BACKEND".to_string())),
        };

        Ok(Self {
            backend,
            database_url: env::var("DATABASE_URL").ok(),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
            leeway_seconds: env::var("TOKEN_LEEWAY_SECONDS")
                .unwrap_or_else(|_| DEFAULT_TOKEN_LEEWAY_SECONDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TOKEN_LEEWAY_SECONDS".to_string()))?,
        })
    }
}

impl AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email: env::var("ADMIN_EMAIL")
                .map_err(|_| ConfigError::Missing("ADMIN_EMAIL".to_string()))?,
        })
    }
}

impl SeasonConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            default_name: env::var("SEASON_DEFAULT_NAME")
                .unwrap_or_else(|_| DEFAULT_SEASON_NAME.to_string()),
            default_length_days: env::var("SEASON_DEFAULT_LENGTH_DAYS")
                .unwrap_or_else(|_| DEFAULT_SEASON_LENGTH_DAYS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SEASON_DEFAULT_LENGTH_DAYS".to_string()))?,
            default_active: env::var("SEASON_DEFAULT_ACTIVE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SEASON_DEFAULT_ACTIVE".to_string()))?,
        })
    }
}

impl MirrorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("MIRROR_URL").ok(),
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Defaults applied when env vars are not set
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let config = Config {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                rust_log: "info".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            auth: AuthConfig {
                jwt_secret: "secret".to_string(),
                leeway_seconds: DEFAULT_TOKEN_LEEWAY_SECONDS,
            },
            admin: AdminConfig {
                email: "admin@example.com".to_string(),
            },
            season: SeasonConfig {
                default_name: DEFAULT_SEASON_NAME.to_string(),
                default_length_days: DEFAULT_SEASON_LENGTH_DAYS,
                default_active: true,
            },
            mirror: MirrorConfig { url: None },
        };
        assert!(config.validate().is_err());
    }
}
