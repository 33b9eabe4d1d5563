//! Encounter loader.
//!
//! An encounter file lists every combatant on the field together with the
//! strategems that drive it. Strategems refer to actions by catalog name and
//! are resolved against an [`ActionCatalog`] when the encounter is built.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use battle_core::{
    ActionDefinition, Alignment, Combatant, CombatantId, Condition, ControlMode, WorldPosition,
};

use crate::loaders::{ActionCatalog, LoadResult, read_file};

/// One strategem as written in content.
///
/// `condition` picks the action's targets. `conditions` are extra gates: each
/// must resolve to at least one unit for the strategem to fire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategemSpec {
    pub action: String,
    pub condition: Condition,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    pub alignment: Alignment,
    pub max_health: u32,
    /// Starting health; full when omitted.
    #[serde(default)]
    pub health: Option<u32>,
    pub charge_rate: f64,
    #[serde(default)]
    pub control: ControlMode,
    #[serde(default)]
    pub position: Option<WorldPosition>,
    /// In priority order.
    #[serde(default)]
    pub strategems: Vec<StrategemSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncounterSpec {
    pub name: String,
    pub combatants: Vec<CombatantSpec>,
}

/// A strategem with its action resolved.
#[derive(Clone, Debug)]
pub struct StrategemEntry {
    pub owner: CombatantId,
    pub definition: Arc<ActionDefinition>,
    /// Targeting condition.
    pub condition: Condition,
    /// Gating conditions, all of which must match.
    pub conditions: Vec<Condition>,
}

/// An encounter ready to be handed to a session builder.
#[derive(Debug)]
pub struct Encounter {
    pub name: String,
    pub combatants: Vec<Combatant>,
    /// Grouped by owner, each owner's entries in priority order.
    pub strategems: Vec<StrategemEntry>,
    pub positions: Vec<(CombatantId, WorldPosition)>,
}

/// Loader for encounters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load an encounter description.
    ///
    /// RON format: [`EncounterSpec`]
    pub fn load(path: &Path) -> LoadResult<EncounterSpec> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<EncounterSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))
    }
}

impl EncounterSpec {
    /// Builds the combatants and resolves every strategem against `catalog`.
    pub fn build(&self, catalog: &ActionCatalog) -> LoadResult<Encounter> {
        let mut seen = BTreeSet::new();
        let mut combatants = Vec::with_capacity(self.combatants.len());
        let mut strategems = Vec::new();
        let mut positions = Vec::new();

        for spec in &self.combatants {
            let id = CombatantId(spec.id);
            if !seen.insert(id) {
                anyhow::bail!("Duplicate combatant id {} in '{}'", spec.id, self.name);
            }

            let mut combatant = Combatant::new(
                id,
                spec.name.clone(),
                spec.alignment,
                spec.max_health,
                spec.charge_rate,
            )
            .map_err(|e| anyhow::anyhow!("Invalid combatant '{}': {}", spec.name, e))?
            .with_control(spec.control);
            if let Some(health) = spec.health {
                combatant = combatant.with_current_health(health);
            }
            combatants.push(combatant);

            if let Some(position) = spec.position {
                positions.push((id, position));
            }

            for strategem in &spec.strategems {
                let definition = catalog.require(&strategem.action).map_err(|e| {
                    anyhow::anyhow!("Combatant '{}' strategem: {}", spec.name, e)
                })?;
                strategems.push(StrategemEntry {
                    owner: id,
                    definition,
                    condition: strategem.condition.clone(),
                    conditions: strategem.conditions.clone(),
                });
            }
        }

        if !self.combatants.iter().any(|c| c.alignment == Alignment::Party)
            || !self.combatants.iter().any(|c| c.alignment == Alignment::Enemy)
        {
            anyhow::bail!("Encounter '{}' needs combatants on both sides", self.name);
        }

        Ok(Encounter {
            name: self.name.clone(),
            combatants,
            strategems,
            positions,
        })
    }
}
