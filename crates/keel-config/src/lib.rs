//! # keel-config
//!
//! Layered configuration loading for Keel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`KEEL_*` prefix, `__` as separator)
//! 2. Project-level `.keel/config.toml`
//! 3. User-level `~/.config/keel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `KEEL_RISK__COMMIT_WEIGHT` -> `risk.commit_weight`,
//! `KEEL_STORAGE__TIMEOUT_MS` -> `storage.timeout_ms`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use keel_config::KeelConfig;
//!
//! let config = KeelConfig::load_with_dotenv().expect("config");
//! println!("critical at {}", config.risk.thresholds[2]);
//! ```

mod error;
mod risk;
mod storage;

pub use error::ConfigError;
pub use risk::RiskConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct KeelConfig {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl KeelConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.risk.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".keel/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("KEEL_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keel").join("config.toml"))
    }

    /// Load `.env` from the workspace root, walking up from
    /// `CARGO_MANIFEST_DIR` when it is set. Silently does nothing if no `.env`
    /// is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = KeelConfig::default();
        config.risk.validate().unwrap();
        assert_eq!(config.storage.timeout_ms, 5_000);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: KeelConfig = KeelConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert!((config.risk.commit_weight - 0.4).abs() < f64::EPSILON);
    }
}
