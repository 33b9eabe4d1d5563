//! Action catalog loader.
//!
//! Loads action definitions from RON data files.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use battle_core::ActionDefinition;

use crate::loaders::{LoadResult, read_file};

/// Action definitions by name.
///
/// Every definition is validated on load, so content mistakes (inverted hit
/// windows, potency lists that do not match the windows, projectiles without
/// a frame-addressable visual) surface here instead of mid-battle.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    definitions: BTreeMap<String, Arc<ActionDefinition>>,
}

impl ActionCatalog {
    /// Load a catalog from a RON file.
    ///
    /// RON format: `Vec<ActionDefinition>`
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Catalog compiled into the crate.
    pub fn bundled() -> LoadResult<Self> {
        Self::parse(include_str!("../../data/actions.ron"))
    }

    pub fn parse(content: &str) -> LoadResult<Self> {
        let definitions: Vec<ActionDefinition> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse action catalog RON: {}", e))?;

        let mut catalog = Self::default();
        for definition in definitions {
            definition
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid action '{}': {}", definition.name, e))?;
            let name = definition.name.clone();
            if catalog
                .definitions
                .insert(name.clone(), Arc::new(definition))
                .is_some()
            {
                anyhow::bail!("Duplicate action '{}'", name);
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ActionDefinition>> {
        self.definitions.get(name).cloned()
    }

    /// Like [`get`](Self::get) but reports unknown names.
    pub fn require(&self, name: &str) -> LoadResult<Arc<ActionDefinition>> {
        self.get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown action '{}'", name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
