use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::ApiError;

/// File-backed configuration: logging options, database credentials and the
/// server bind address. JSON or YAML, selected by file extension.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logger: LoggerConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load and parse a config file, then validate it. Any failure here is
    /// fatal to startup.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: Config = match ext {
            "json" => serde_json::from_str(&content).map_err(|e| {
                ApiError::Config(format!("failed to parse {}: {e}", path.display()))
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| {
                ApiError::Config(format!("failed to parse {}: {e}", path.display()))
            })?,
            other => {
                return Err(ApiError::Config(format!(
                    "unsupported configuration file format: .{other}"
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ApiError> {
        self.logger.validate()?;
        self.database.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

impl LoggerConfig {
    fn validate(&self) -> Result<(), ApiError> {
        tracing::Level::from_str(&self.level).map_err(|_| {
            ApiError::Config(format!("invalid logger level: {:?}", self.level))
        })?;
        Ok(())
    }
}

impl DatabaseConfig {
    /// Connect options for the judge database. TLS stays disabled, matching
    /// the deployment this service fronts.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }

    fn validate(&self) -> Result<(), ApiError> {
        host("database.host", &self.host)?;
        required("database.username", &self.username)?;
        required("database.password", &self.password)?;
        required("database.database", &self.database)?;
        Ok(())
    }
}

impl ServerConfig {
    /// Bind address for the HTTP listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), ApiError> {
        host("server.host", &self.host)?;
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

/// A hostname or IP literal: dot/colon-separated alphanumeric labels,
/// hyphens and underscores allowed inside labels.
fn host(field: &str, value: &str) -> Result<(), ApiError> {
    required(field, value)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'));
    if !valid {
        return Err(ApiError::Config(format!("{field} is not a valid host: {value:?}")));
    }
    Ok(())
}
