//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `SALON__*` environment
//! variables (e.g. `SALON__SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Scheduling {
    /// IANA name of the business timezone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Initial status of new appointments: `pending` or `confirmed`.
    #[serde(default = "default_status")]
    pub default_status: String,
}

impl Default for Scheduling {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_status: default_status(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub scheduling: Scheduling,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SALON").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
