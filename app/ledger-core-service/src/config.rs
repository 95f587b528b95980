//! Service configuration, following `gl-rs::config::Config::from_env`:
//! one struct, loaded once at startup, every field backed by an env var
//! with a sane default for local development.

use config_validator::{optional, optional_parsed, require};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bus_type: String,
    pub nats_url: String,
    pub redis_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, config_validator::ConfigError> {
        Ok(Config {
            database_url: require("DATABASE_URL")?,
            bus_type: optional("BUS_TYPE", "inmemory"),
            nats_url: optional("NATS_URL", "nats://localhost:4222"),
            redis_url: std::env::var("REDIS_URL").ok(),
            host: optional("HOST", "0.0.0.0"),
            port: optional_parsed("PORT", 8090),
        })
    }
}
