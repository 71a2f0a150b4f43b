//! Application settings from config.toml.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [client]
//! base_url = "http://127.0.0.1:8080"
//! mirror_dir = "data/mirror"
//! poll_interval_ms = 1000
//!
//! [[tokens]]
//! token = "..."
//! email = "admin@apotik.local"
//! role = "Admin"
//!
//! [[apotiks]]
//! id = "A1"
//! code = "APT01"
//! name = "Apotik Pusat"
//! ```
//!
//! Every section is optional; missing values take the defaults shown above.

use crate::{
    api::Role,
    errors::{Error, Result},
    models::Branch,
};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Whole config.toml
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// `[server]`
    #[serde(default)]
    pub server: ServerConfig,
    /// `[client]`
    #[serde(default)]
    pub client: ClientConfig,
    /// Session tokens accepted by the data API
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    /// Branches seeded into the `apotiks` key on first start
    #[serde(default)]
    pub apotiks: Vec<Branch>,
}

/// Data API listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Client-side sync settings
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Data API root; keys are appended as `/api/data/{key}`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory holding one `<key>.json` file per collection
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: String,
    /// How often the mirror watcher re-reads local data
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl ClientConfig {
    /// [`Self::poll_interval_ms`] as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mirror_dir: default_mirror_dir(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// One accepted session token and who it belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Bearer token as sent by clients
    pub token: String,
    pub email: String,
    pub role: Role,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_mirror_dir() -> String {
    "data/mirror".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read, the TOML is invalid,
/// or the poll interval is zero.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    if config.client.poll_interval_ms == 0 {
        return Err(Error::Config {
            message: "client.poll_interval_ms must be greater than zero".to_string(),
        });
    }
    Ok(config)
}

/// Loads settings from `CONFIG_PATH` (default `config.toml`).
///
/// A missing file is not an error: the defaults are used and a note is logged.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!("No config file at {path}, using defaults");
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!(
        tokens = config.tokens.len(),
        apotiks = config.apotiks.len(),
        "Loaded configuration from {path}"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind = "0.0.0.0:9000"

            [client]
            base_url = "https://backoffice.example"
            mirror_dir = "/tmp/mirror"
            poll_interval_ms = 250

            [[tokens]]
            token = "t-admin"
            email = "admin@apotik.local"
            role = "Admin"

            [[tokens]]
            token = "t-kasir"
            email = "kasir@apotik.local"
            role = "Staff"

            [[apotiks]]
            id = "A1"
            code = "APT01"
            name = "Apotik Pusat"
            city = "Bandung"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.client.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.tokens[1].role, Role::Staff);
        assert_eq!(config.apotiks[0].city.as_deref(), Some("Bandung"));
        assert!(config.apotiks[0].active);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.client.mirror_dir, "data/mirror");
        assert_eq!(config.client.poll_interval_ms, 1000);
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let result = parse_config("[client]\npoll_interval_ms = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
