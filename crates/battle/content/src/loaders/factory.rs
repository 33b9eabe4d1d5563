//! Content factory for loading a battle from a data directory.

use std::path::PathBuf;

use battle_core::BattleConfig;

use crate::loaders::{ActionCatalog, ConfigLoader, Encounter, EncounterLoader, LoadResult};

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── actions.ron
/// └── encounters/
///     ├── slime_cave.ron
///     └── ambush.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(crate::BUNDLED_DATA_DIR)
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the action catalog from `actions.ron`.
    pub fn load_actions(&self) -> LoadResult<ActionCatalog> {
        ActionCatalog::load(&self.data_dir.join("actions.ron"))
    }

    /// Load `encounters/<name>.ron` and resolve it against `catalog`.
    pub fn load_encounter(&self, name: &str, catalog: &ActionCatalog) -> LoadResult<Encounter> {
        let path = self
            .data_dir
            .join("encounters")
            .join(format!("{name}.ron"));
        EncounterLoader::load(&path)?.build(catalog)
    }

    /// Names of the encounters under `encounters/`, sorted.
    pub fn encounter_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("encounters");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_encounters_load() {
        let factory = ContentFactory::bundled();
        let catalog = factory.load_actions().unwrap();
        let names = factory.encounter_names().unwrap();
        assert_eq!(names, vec!["ambush", "slime_cave"]);

        for name in names {
            let encounter = factory.load_encounter(&name, &catalog).unwrap();
            assert!(!encounter.combatants.is_empty());
            assert!(!encounter.strategems.is_empty());
        }
    }

    #[test]
    fn slime_king_flurry_is_gated() {
        use battle_core::{Alignment, CombatantId, Condition};

        let factory = ContentFactory::bundled();
        let catalog = factory.load_actions().unwrap();
        let encounter = factory.load_encounter("slime_cave", &catalog).unwrap();

        let flurry = encounter
            .strategems
            .iter()
            .find(|s| s.owner == CombatantId(12) && s.definition.name == "Flurry")
            .unwrap();
        assert_eq!(
            flurry.conditions,
            vec![Condition::forecast_below(Alignment::Party, 60, true)]
        );
    }

    #[test]
    fn missing_encounter_reports_the_path() {
        let factory = ContentFactory::bundled();
        let catalog = factory.load_actions().unwrap();
        let err = factory.load_encounter("nowhere", &catalog).unwrap_err();
        assert!(err.to_string().contains("nowhere.ron"));
    }
}
