use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// List bundled actions and encounters
#[derive(Parser, Debug)]
pub struct List {
    /// Content directory (defaults to the bundled data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl List {
    pub fn execute(self) -> Result<()> {
        let factory = super::factory(self.data_dir);
        let catalog = factory.load_actions()?;

        println!("Actions:");
        for name in catalog.names() {
            let Some(action) = catalog.get(name) else {
                continue;
            };
            let effect = action
                .effect
                .as_ref()
                .map_or_else(|| "no effect".to_owned(), |e| format!("{} {}", e.kind, e.damage_type));
            println!(
                "  {:<12} ct {:>5.0}  {:<18} hits {}",
                name,
                action.ct_cost,
                effect,
                action.effective_hit_windows().len()
            );
        }

        println!("Encounters:");
        for name in factory.encounter_names()? {
            let encounter = factory.load_encounter(&name, &catalog)?;
            println!(
                "  {:<12} {} ({} combatants)",
                name,
                encounter.name,
                encounter.combatants.len()
            );
        }
        Ok(())
    }
}
