use std::path::Path;

use anyhow::Context;
use keel_config::KeelConfig;
use keel_governance::Governance;

use crate::cli::GlobalFlags;

/// Load layered configuration, applying the `--db` override.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<KeelConfig> {
    let mut config = KeelConfig::load_with_dotenv().context("failed to load keel configuration")?;
    if let Some(db) = &flags.db {
        config.storage.db_path.clone_from(db);
    }
    tracing::debug!(db_path = %config.storage.db_path, "resolved configuration");
    Ok(config)
}

pub async fn open_governance(config: &KeelConfig) -> anyhow::Result<Governance> {
    ensure_parent_dir(&config.storage.db_path)?;
    Ok(Governance::open(config).await?)
}

fn ensure_parent_dir(db_path: &str) -> anyhow::Result<()> {
    if db_path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
