// src/config/settings.rs
//! Layered configuration for the authentication service.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional `path2zero.toml` (or `.yaml`/`.json`) in the working directory
//! 3. `PATH2ZERO__*` environment variables, `__` separating nested keys
//!    (e.g. `PATH2ZERO__REGISTRY__TIMEOUT_SECS=5`)
//! 4. Legacy variables: `CARBONMARK_API_KEY`, `CARBONMARK_BASE_URL`,
//!    `API_PORT`, `STORACHA_LISTINGS_CID` / `LISTINGS_CID`
//!
//! `main` loads `.env` through `dotenv` before any of this runs.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REGISTRY_URL: &str = "https://v18.api.carbonmark.com";

/// Complete service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub registry: RegistrySettings,
    pub storage: StorageSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound for request bodies, certificate uploads included
    pub max_upload_bytes: usize,
}

/// Carbon registry API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Lifetime of the cached listings snapshot; `0` disables caching
    pub cache_ttl_secs: u64,
}

/// Marketplace listing storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub listings_path: PathBuf,
    /// IPFS API endpoint; the mirror is disabled when unset
    #[serde(default)]
    pub ipfs_url: Option<String>,
    /// Content id of a mirrored listing set, overriding the pointer file
    #[serde(default)]
    pub listings_cid: Option<String>,
}

impl Settings {
    /// Loads settings from every source.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source cannot be parsed, a value has the
    /// wrong type, or the registry API key is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let legacy_cid = env::var("STORACHA_LISTINGS_CID")
            .or_else(|_| env::var("LISTINGS_CID"))
            .ok();

        let config = Self::defaults()?
            .add_source(File::with_name("path2zero").required(false))
            .add_source(Environment::with_prefix("PATH2ZERO").separator("__"))
            .set_override_option("registry.api_key", env::var("CARBONMARK_API_KEY").ok())?
            .set_override_option("registry.base_url", env::var("CARBONMARK_BASE_URL").ok())?
            .set_override_option("server.port", env::var("API_PORT").ok())?
            .set_override_option("storage.listings_cid", legacy_cid)?
            .build()?;

        Self::from_config(config)
    }

    /// Builder pre-populated with the built-in defaults.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("server.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("registry.base_url", DEFAULT_REGISTRY_URL)?
            .set_default("registry.api_key", "")?
            .set_default("registry.timeout_secs", 10)?
            .set_default("registry.cache_ttl_secs", 0)?
            .set_default("storage.listings_path", "server/data/listings.json")
    }

    /// Deserializes and validates a built configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "registry API key is not set (CARBONMARK_API_KEY or PATH2ZERO__REGISTRY__API_KEY)".into(),
            ));
        }
        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::Message("registry.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

impl ServerSettings {
    /// Socket address to bind the HTTP listener to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid server.host {}: {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl RegistrySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache lifetime, or `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Settings::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Settings::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults_with_api_key() {
        let settings = build(&[("registry.api_key", "cm_test")]).unwrap();

        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.registry.base_url, DEFAULT_REGISTRY_URL);
        assert_eq!(settings.registry.timeout(), Duration::from_secs(10));
        assert_eq!(settings.registry.cache_ttl(), None);
        assert_eq!(settings.storage.listings_path, PathBuf::from("server/data/listings.json"));
        assert!(settings.storage.ipfs_url.is_none());
        assert_eq!(
            settings.server.socket_addr().unwrap(),
            "127.0.0.1:3001".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = build(&[]).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let settings = build(&[
            ("registry.api_key", "cm_test"),
            ("registry.cache_ttl_secs", "300"),
            ("server.port", "8080"),
            ("storage.ipfs_url", "http://localhost:5001"),
        ])
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.registry.cache_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(settings.storage.ipfs_url.as_deref(), Some("http://localhost:5001"));
    }

    #[test]
    fn test_invalid_host() {
        let settings = build(&[("registry.api_key", "k"), ("server.host", "not-an-ip")]).unwrap();
        assert!(settings.server.socket_addr().is_err());
    }
}
