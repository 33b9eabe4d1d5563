use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use battle_core::{ClockMode, Combatant};
use battle_runtime::{ActionInstance, BattleSession, FirstChoicePrompt, StaticWorld, Strategem};

use crate::narrator::Narrator;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Mode {
    /// Halt the clock while the next turn has to wait
    Wait,
    /// Keep charging and start every eligible turn
    Active,
}

impl From<Mode> for ClockMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Wait => ClockMode::Wait,
            Mode::Active => ClockMode::Active,
        }
    }
}

/// Play an encounter to the end
#[derive(Parser, Debug)]
pub struct Run {
    /// Encounter name (a file under `encounters/` without extension)
    #[arg(default_value = "slime_cave")]
    pub encounter: String,

    /// Content directory (defaults to the bundled data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Seed for charge entropy and target shuffles
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the configured clock mode
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Override the configured tick length
    #[arg(long)]
    pub tick_rate_ms: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 5_000)]
    pub tick_limit: u64,

    /// Delay before a player-controlled combatant takes its first option
    #[arg(long, default_value_t = 400)]
    pub think_ms: u64,
}

impl Run {
    pub async fn execute(self) -> Result<()> {
        let factory = super::factory(self.data_dir);
        let mut config = factory.load_config().context("loading battle config")?;
        if let Some(mode) = self.mode {
            config.clock_mode = mode.into();
        }
        if let Some(tick_rate_ms) = self.tick_rate_ms {
            config = config.with_tick_rate_ms(tick_rate_ms);
        }

        let catalog = factory.load_actions().context("loading action catalog")?;
        let encounter = factory
            .load_encounter(&self.encounter, &catalog)
            .with_context(|| format!("loading encounter '{}'", self.encounter))?;

        let world = Arc::new(StaticWorld::new());
        for (id, position) in &encounter.positions {
            world.set_position(*id, *position);
        }

        let names: BTreeMap<_, _> = encounter
            .combatants
            .iter()
            .map(|c| (c.id(), c.name().to_owned()))
            .collect();
        let players: Vec<_> = encounter
            .combatants
            .iter()
            .filter(|c| c.is_manual())
            .map(Combatant::id)
            .collect();

        let mut builder = BattleSession::builder()
            .config(config)
            .world(world)
            .combatants(encounter.combatants);
        for entry in encounter.strategems {
            let action =
                ActionInstance::from_definition(entry.owner, entry.definition, entry.condition)?;
            let strategem = entry
                .conditions
                .into_iter()
                .fold(Strategem::new(action), Strategem::with_condition);
            builder = builder.strategem(strategem);
        }
        let think_time = Duration::from_millis(self.think_ms);
        for id in players {
            builder = builder.prompt_provider(id, Arc::new(FirstChoicePrompt::new(think_time)));
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        let session = builder.build()?;

        info!(
            target: "battle::cli",
            encounter = %encounter.name,
            combatants = names.len(),
            mode = %session.config().clock_mode,
            "encounter loaded"
        );

        let narrator = Narrator::new(names.clone()).spawn(session.events());
        let outcome = session.run(Some(self.tick_limit)).await;
        session.teardown().await;
        narrator.abort();

        println!("{} after {} ticks", outcome, session.current_tick().0);
        for (id, name) in &names {
            let Some(snapshot) = session.snapshot(*id) else {
                continue;
            };
            println!(
                "  {:<12} {:<6} {:>4}/{:<4} {}",
                name,
                snapshot.alignment,
                snapshot.health,
                snapshot.max_health,
                if snapshot.is_alive { "" } else { "down" }
            );
        }
        Ok(())
    }
}
