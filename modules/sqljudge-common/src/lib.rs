pub mod config;
pub mod error;

pub use config::{Config, DatabaseConfig, LoggerConfig, ServerConfig};
pub use error::ApiError;
