//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`BattleConfig`] from a TOML file. Missing keys keep their
    /// defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.tick_rate_ms == 0 {
            anyhow::bail!("tick_rate_ms must be positive");
        }
        Ok(config)
    }
}
