//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWA_*)
//! 2. TOML config file (if PWA_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is immutable. The worker and the page controller each
//! receive their own slice of it at construction time.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod modes;
mod validation;

pub use modes::{RenderMode, UpdateMode};
pub use validation::ConfigError;

/// Prefix of every versioned offline cache store.
pub const OFFLINE_CACHE_PREFIX: &str = "offline-v";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWA_*)
/// 2. TOML config file (if PWA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker is installed on. Relative URLs resolve against it.
    ///
    /// Set via PWA_SITE_ORIGIN environment variable.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Version of the offline cache store (`offline-v<N>`).
    ///
    /// Set via PWA_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Logical path of the offline fallback document.
    ///
    /// Set via PWA_OFFLINE_URL environment variable.
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Scope the worker registers under.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Path of the generated worker script.
    #[serde(default = "default_worker_script")]
    pub worker_script: String,

    /// Set via PWA_RENDER_MODE environment variable.
    #[serde(default)]
    pub render_mode: RenderMode,

    /// Set via PWA_UPDATE_MODE environment variable.
    #[serde(default)]
    pub update_mode: UpdateMode,

    /// Path to SQLite cache database.
    ///
    /// Set via PWA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PWA_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_site_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_offline_url() -> String {
    "/offline".into()
}

fn default_scope() -> String {
    "/".into()
}

fn default_worker_script() -> String {
    "/generated-service-worker.js".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwa-offline-cache.sqlite")
}

fn default_user_agent() -> String {
    "pwa-offline/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_origin: default_site_origin(),
            cache_version: default_cache_version(),
            offline_url: default_offline_url(),
            scope: default_scope(),
            worker_script: default_worker_script(),
            render_mode: RenderMode::default(),
            update_mode: UpdateMode::default(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the active offline cache store.
    pub fn offline_cache_name(&self) -> String {
        format!("{OFFLINE_CACHE_PREFIX}{}", self.cache_version)
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute URL.
    pub fn origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site_origin)
            .map_err(|e| ConfigError::Invalid { field: "site_origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWA_`
    /// 2. TOML file from `PWA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PWA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWA_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
