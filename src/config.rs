//! Service configuration
//!
//! Read from the TOML file named by `PURCHASE_TOOL_CONFIG` when set, then
//! overridden by `PURCHASE_TOOL_PORT` and `UNSPLASH_ACCESS_KEY`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "PURCHASE_TOOL_CONFIG";
/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PURCHASE_TOOL_PORT";
/// Environment variable providing the Unsplash access key
pub const UNSPLASH_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default `tracing` filter when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Entity whose metadata drives the type/family picklists
    #[serde(default = "default_item_entity")]
    pub item_entity: String,

    #[serde(default)]
    pub unsplash: UnsplashConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashConfig {
    /// Image lookup is disabled without a key
    #[serde(default)]
    pub access_key: Option<String>,

    #[serde(default = "default_unsplash_url")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter(),
            item_entity: default_item_entity(),
            unsplash: UnsplashConfig::default(),
        }
    }
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: default_unsplash_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_item_entity() -> String {
    "Item__c".to_string()
}

fn default_unsplash_url() -> String {
    "https://api.unsplash.com".to_string()
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Config::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port = port
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_ENV, port))?;
        }
        if let Ok(key) = std::env::var(UNSPLASH_KEY_ENV) {
            if !key.is_empty() {
                config.unsplash.access_key = Some(key);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.item_entity, "Item__c");
        assert_eq!(config.unsplash.access_key, None);
        assert_eq!(config.unsplash.base_url, "https://api.unsplash.com");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = Config::from_toml(
            r#"
            port = 9100
            log_filter = "purchase_tool=debug"

            [unsplash]
            access_key = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.log_filter, "purchase_tool=debug");
        assert_eq!(config.unsplash.access_key.as_deref(), Some("abc"));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::from_toml("port = \"eighty\"").is_err());
    }
}
