//! Storage configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".keel/keel.db".to_string()
}

/// Default per-call store deadline.
const fn default_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path to the libSQL database file, or `":memory:"`.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Deadline applied to every store call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = StorageConfig::default();
        assert_eq!(config.db_path, ".keel/keel.db");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
