//! Application settings.
//!
//! Layered from `config/default.toml`, an optional `config/local.toml`
//! and `BILANCIO__`-prefixed environment variables, later sources
//! overriding earlier ones (`BILANCIO__SERVER__PORT=8080` overrides
//! `[server] port`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (`trace` .. `error`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    /// Sqlite file path, or `":memory:"`.
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("BILANCIO")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
