//! Shared configuration for petal tools.
//!
//! Layered loading (built-in defaults, then the TOML file in the platform
//! config directory, then `PETAL_*` environment variables) and translation
//! to `petal_core::BackendConfig`. Read once at process start.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use petal_core::BackendConfig;
use petal_core::config::DEFAULT_CITY_ID;

/// Prefix for environment overrides (`PETAL_BASE_URL`, `PETAL_CITY_ID`, ...).
pub const ENV_PREFIX: &str = "PETAL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no backend URL configured (set base_url or {ENV_PREFIX}BASE_URL)")]
    MissingBaseUrl,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// File and environment configuration. Durations are whole seconds
/// unless the key says otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backend root, e.g. "https://shop.example.com".
    pub base_url: Option<String>,

    /// Static access token (plaintext; prefer `PETAL_ACCESS_TOKEN`).
    pub access_token: Option<String>,

    /// Tenant id sent with product queries.
    #[serde(default = "default_city_id", deserialize_with = "string_or_number")]
    pub city_id: String,

    pub shop_id: Option<u64>,

    /// Extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_item_timeout")]
    pub item_timeout: u64,

    #[serde(default = "default_orders_per_customer")]
    pub orders_per_customer: u32,

    /// Consecutive failures that open a request's circuit. 0 disables it.
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,

    /// Seconds an open circuit rejects calls.
    #[serde(default = "default_breaker_reset")]
    pub breaker_reset: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            access_token: None,
            city_id: default_city_id(),
            shop_id: None,
            ca_cert: None,
            timeout: default_timeout(),
            read_retries: default_read_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            cache_ttl: default_cache_ttl(),
            batch_size: default_batch_size(),
            item_timeout: default_item_timeout(),
            orders_per_customer: default_orders_per_customer(),
            breaker_threshold: default_breaker_threshold(),
            breaker_reset: default_breaker_reset(),
        }
    }
}

/// Environment values that look numeric arrive as numbers.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn default_city_id() -> String {
    DEFAULT_CITY_ID.into()
}
fn default_timeout() -> u64 {
    20
}
fn default_read_retries() -> u32 {
    2
}
fn default_retry_base_delay_ms() -> u64 {
    300
}
fn default_cache_ttl() -> u64 {
    60
}
fn default_batch_size() -> usize {
    5
}
fn default_item_timeout() -> u64 {
    10
}
fn default_orders_per_customer() -> u32 {
    50
}
fn default_breaker_threshold() -> u32 {
    5
}
fn default_breaker_reset() -> u64 {
    60
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "petal", "petal").map_or_else(
        || PathBuf::from(".petal.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Layer defaults, the TOML file at `path`, and the environment.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the runtime `BackendConfig`.
    pub fn to_backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url: url::Url = raw.parse().map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL {raw}: {e}"),
        })?;

        let mut backend = BackendConfig::new(base_url);
        backend.access_token = self
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        backend.city_id.clone_from(&self.city_id);
        backend.shop_id = self.shop_id;
        backend.ca_cert.clone_from(&self.ca_cert);
        backend.timeout = Duration::from_secs(self.timeout);
        backend.read_retries = self.read_retries;
        backend.retry_base_delay = Duration::from_millis(self.retry_base_delay_ms);
        backend.cache_ttl = Duration::from_secs(self.cache_ttl);
        backend.batch_size = self.batch_size;
        backend.item_timeout = Duration::from_secs(self.item_timeout);
        backend.orders_per_customer = self.orders_per_customer;
        backend.breaker_threshold = self.breaker_threshold;
        backend.breaker_open_for = Duration::from_secs(self.breaker_reset);

        backend.validate().map_err(|e| ConfigError::Validation {
            field: "backend".into(),
            reason: e.to_string(),
        })?;
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn load(jail: &Jail) -> Result<Config, figment::Error> {
        load_config_from(&jail.directory().join("config.toml")).map_err(|e| e.to_string().into())
    }

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|jail| {
            let cfg = load(jail)?;
            assert_eq!(cfg, Config::default());
            assert!(matches!(
                cfg.to_backend_config(),
                Err(ConfigError::MissingBaseUrl)
            ));
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    base_url = "https://shop.example.com"
                    city_id = "3"
                    batch_size = 8
                "#,
            )?;
            jail.set_env("PETAL_CITY_ID", "7");
            jail.set_env("PETAL_ACCESS_TOKEN", "secret-token");
            jail.set_env("PETAL_BREAKER_RESET", "90");

            let cfg = load(jail)?;
            assert_eq!(cfg.city_id, "7");
            assert_eq!(cfg.batch_size, 8);
            assert_eq!(cfg.timeout, 20);
            assert_eq!(cfg.breaker_threshold, 5);

            let backend = cfg.to_backend_config().map_err(|e| e.to_string())?;
            assert_eq!(backend.base_url.as_str(), "https://shop.example.com/");
            assert_eq!(backend.batch_size, 8);
            assert_eq!(backend.breaker_open_for, Duration::from_secs(90));
            assert_eq!(
                backend.access_token.as_ref().map(|t| t.expose_secret().to_owned()),
                Some("secret-token".to_owned())
            );
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("PETAL_BASE_URL", "https://shop.example.com");
            jail.set_env("PETAL_BATCH_SIZE", "0");
            let cfg = load(jail)?;
            assert!(matches!(
                cfg.to_backend_config(),
                Err(ConfigError::Validation { .. })
            ));

            jail.set_env("PETAL_BASE_URL", "not a url");
            jail.set_env("PETAL_BATCH_SIZE", "5");
            let cfg = load(jail)?;
            assert!(cfg.to_backend_config().is_err());
            Ok(())
        });
    }

    #[test]
    fn saved_config_round_trips_through_loader() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let cfg = Config {
                base_url: Some("https://shop.example.com".into()),
                city_id: "4".into(),
                ..Config::default()
            };
            save_config_to(&cfg, &path).map_err(|e| e.to_string())?;

            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded, cfg);
            Ok(())
        });
    }
}
