use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinSet;
use tracing::info;

use battle_core::{AnimationSpec, BattleConfig, Combatant, CombatantId, seed_charge_entropy};

use super::{BattleSession, BattleState, SessionInner};
use crate::api::{
    HeadlessVisualPlayer, PromptProvider, Result, RuntimeError, StaticWorld, VisualPlayer,
    WorldPlacement,
};
use crate::events::EventBus;
use crate::strategem::Strategem;
use crate::visual::Graphic;

/// Builder for [`BattleSession`].
///
/// Collaborators default to the headless implementations, so a session can be
/// built with nothing but a roster.
pub struct BattleSessionBuilder {
    config: BattleConfig,
    combatants: Vec<Combatant>,
    strategems: Vec<Strategem>,
    prompts: HashMap<CombatantId, Arc<dyn PromptProvider>>,
    visuals: Option<Arc<dyn VisualPlayer>>,
    world: Option<Arc<dyn WorldPlacement>>,
    intent_cue: AnimationSpec,
    seed: Option<u64>,
    charge_entropy: bool,
}

impl BattleSessionBuilder {
    pub fn new() -> Self {
        Self {
            config: BattleConfig::default(),
            combatants: Vec::new(),
            strategems: Vec::new(),
            prompts: HashMap::new(),
            visuals: None,
            world: None,
            intent_cue: AnimationSpec::still("intent_cue"),
            seed: None,
            charge_entropy: true,
        }
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn combatant(mut self, combatant: Combatant) -> Self {
        self.combatants.push(combatant);
        self
    }

    pub fn combatants(mut self, combatants: impl IntoIterator<Item = Combatant>) -> Self {
        self.combatants.extend(combatants);
        self
    }

    /// Appends a strategem to its owner's list. Order is priority order.
    pub fn strategem(mut self, strategem: Strategem) -> Self {
        self.strategems.push(strategem);
        self
    }

    pub fn strategems(mut self, strategems: impl IntoIterator<Item = Strategem>) -> Self {
        self.strategems.extend(strategems);
        self
    }

    pub fn prompt_provider(
        mut self,
        combatant: CombatantId,
        provider: Arc<dyn PromptProvider>,
    ) -> Self {
        self.prompts.insert(combatant, provider);
        self
    }

    pub fn visuals(mut self, visuals: Arc<dyn VisualPlayer>) -> Self {
        self.visuals = Some(visuals);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldPlacement>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn intent_cue(mut self, cue: AnimationSpec) -> Self {
        self.intent_cue = cue;
        self
    }

    /// Seeds the session RNG (targeting shuffles and charge entropy).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Starts every meter at zero instead of seeding it by rate band.
    pub fn without_charge_entropy(mut self) -> Self {
        self.charge_entropy = false;
        self
    }

    pub fn build(self) -> Result<BattleSession> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut roster = BTreeMap::new();
        for combatant in self.combatants {
            roster.insert(combatant.id(), combatant);
        }

        if self.charge_entropy {
            seed_charge_entropy(roster.values_mut().map(Combatant::charge_mut), &mut rng);
            for combatant in roster.values_mut() {
                let seeded = combatant.charge().value();
                combatant.seed_charge(seeded);
            }
        }

        let mut strategems: HashMap<CombatantId, Vec<Strategem>> = HashMap::new();
        for strategem in self.strategems {
            let owner = strategem.owner();
            if !roster.contains_key(&owner) {
                return Err(RuntimeError::UnknownCombatant(owner));
            }
            strategems.entry(owner).or_default().push(strategem);
        }

        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let state = BattleState::new(roster, strategems, rng, events.clone());

        info!(
            target: "battle::session",
            combatants = state.roster.len(),
            mode = %self.config.clock_mode,
            "session created"
        );

        Ok(BattleSession {
            inner: Arc::new(SessionInner {
                config: self.config,
                state: Mutex::new(state),
                events,
                visuals: self
                    .visuals
                    .unwrap_or_else(|| Arc::new(HeadlessVisualPlayer::default())),
                world: self.world.unwrap_or_else(|| Arc::new(StaticWorld::new())),
                prompts: Mutex::new(self.prompts),
                intent_cue: Graphic::new(self.intent_cue),
                tasks: Mutex::new(JoinSet::new()),
            }),
        })
    }
}

impl Default for BattleSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
