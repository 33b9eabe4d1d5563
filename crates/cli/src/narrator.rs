//! Turns runtime events into log lines with combatant names.

use std::collections::BTreeMap;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use battle_core::CombatantId;
use battle_runtime::{ActionEvent, CombatantEvent, Event, EventBus, Topic, TurnEvent};

pub struct Narrator {
    names: BTreeMap<CombatantId, String>,
}

impl Narrator {
    pub fn new(names: BTreeMap<CombatantId, String>) -> Self {
        Self { names }
    }

    /// Follows every topic until the bus closes or the task is aborted.
    pub fn spawn(self, bus: &EventBus) -> JoinHandle<()> {
        let mut turns = bus.subscribe(Topic::Turn);
        let mut combatants = bus.subscribe(Topic::Combatant);
        let mut actions = bus.subscribe(Topic::Action);

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    r = turns.recv() => r,
                    r = combatants.recv() => r,
                    r = actions.recv() => r,
                };
                match received {
                    Ok(event) => self.narrate(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "battle::cli", skipped, "narrator fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn name(&self, id: CombatantId) -> &str {
        self.names.get(&id).map_or("?", String::as_str)
    }

    fn narrate(&self, event: &Event) {
        match event {
            Event::Turn(turn) => self.narrate_turn(turn),
            Event::Combatant(combatant) => self.narrate_combatant(combatant),
            Event::Action(ActionEvent::Failed { owner, action, error }) => {
                warn!(target: "battle::cli", "{}'s {} failed: {}", self.name(*owner), action, error);
            }
            Event::Action(other) => trace!(target: "battle::cli", ?other),
        }
    }

    fn narrate_turn(&self, event: &TurnEvent) {
        match event {
            TurnEvent::Started {
                combatant,
                action,
                tick,
            } => info!(target: "battle::cli", %tick, "{} uses {}", self.name(*combatant), action),
            TurnEvent::PromptResolved { combatant, action } => {
                info!(target: "battle::cli", "{} chooses {}", self.name(*combatant), action);
            }
            TurnEvent::PromptFailed { combatant, error } => {
                warn!(target: "battle::cli", "{} could not choose: {}", self.name(*combatant), error);
            }
            TurnEvent::Deferred { combatant, reason } => {
                debug!(target: "battle::cli", %reason, "{} waits", self.name(*combatant));
            }
            TurnEvent::Skipped { combatant, reason } => {
                debug!(target: "battle::cli", %reason, "{} skips", self.name(*combatant));
            }
            other => trace!(target: "battle::cli", ?other),
        }
    }

    fn narrate_combatant(&self, event: &CombatantEvent) {
        match event {
            CombatantEvent::Hurt {
                target,
                attacker,
                amount,
                damage_type,
            } => info!(
                target: "battle::cli",
                "{} hits {} for {} ({})",
                self.name(*attacker),
                self.name(*target),
                amount,
                damage_type
            ),
            CombatantEvent::Healed {
                target,
                healer,
                amount,
            } => info!(
                target: "battle::cli",
                "{} restores {} to {}",
                self.name(*healer),
                amount,
                self.name(*target)
            ),
            CombatantEvent::Died { combatant } => {
                info!(target: "battle::cli", "{} is defeated", self.name(*combatant));
            }
            other => trace!(target: "battle::cli", ?other),
        }
    }
}

