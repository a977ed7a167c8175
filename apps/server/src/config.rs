//! Server configuration.
//!
//! Loaded in layers, later sources winning:
//! 1. Defaults in code
//! 2. `config/shopkeep.toml` (optional)
//! 3. Environment variables prefixed `SHOPKEEP__`, e.g. `SHOPKEEP__SERVER__PORT=8080`
//!
//! `cors.allowed_origins` accepts a comma separated list from the environment.

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use shopkeep_db::DbConfig;

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directives. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl AppConfig {
    /// Loads configuration from file and environment on top of the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("config/shopkeep").required(false))
            .add_source(
                Environment::with_prefix("SHOPKEEP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// Builder pre-populated with every default.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.path", "./shopkeep.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default(
                "log.filter",
                "info,shopkeep=debug,tower_http=debug,sqlx=warn",
            )
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pool settings for [`shopkeep_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        if self.database.path == ":memory:" {
            return DbConfig::in_memory();
        }
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
    }
}
