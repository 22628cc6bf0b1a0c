//! Integration tests for TOML + environment layering.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use keel_config::{ConfigError, KeelConfig};
use pretty_assertions::assert_eq;

fn jailed_figment() -> Figment {
    Figment::from(Serialized::defaults(KeelConfig::default()))
        .merge(Toml::file("config.toml"))
        .merge(Env::prefixed("KEEL_").split("__"))
}

#[test]
fn loads_risk_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[risk]
commit_weight = 0.5
volatility_weight = 0.3
discussion_weight = 0.2
thresholds = [20, 40, 80]
commit_window_days = 30
"#,
        )?;

        let config = KeelConfig::from_figment(&jailed_figment()).expect("valid config");
        assert_eq!(config.risk.thresholds, vec![20, 40, 80]);
        assert_eq!(config.risk.commit_window_days, 30);
        assert!((config.risk.commit_weight - 0.5).abs() < f64::EPSILON);
        // untouched fields keep their defaults
        assert!((config.risk.commit_scale - 10.0).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
db_path = "from-toml.db"
timeout_ms = 100
"#,
        )?;
        jail.set_env("KEEL_STORAGE__TIMEOUT_MS", "250");

        let config = KeelConfig::from_figment(&jailed_figment()).expect("valid config");
        assert_eq!(config.storage.db_path, "from-toml.db");
        assert_eq!(config.storage.timeout_ms, 250);
        Ok(())
    });
}

#[test]
fn invalid_weights_fail_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[risk]
commit_weight = 0.9
",
        )?;

        let result = KeelConfig::from_figment(&jailed_figment());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}

#[test]
fn thresholds_from_env_array() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "")?;
        jail.set_env("KEEL_RISK__THRESHOLDS", "[10, 20, 30]");

        let config = KeelConfig::from_figment(&jailed_figment()).expect("valid config");
        assert_eq!(config.risk.thresholds, vec![10, 20, 30]);
        Ok(())
    });
}
