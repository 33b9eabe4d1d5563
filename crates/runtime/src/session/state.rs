//! Mutable battle state guarded by the session mutex.
//!
//! Everything the scheduler and the components' synchronous hooks touch lives
//! here, so target locking and forecasting happen under one lock and never
//! straddle an await point.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use battle_core::{
    ActionQueue, Alignment, Combatant, CombatantId, DamageType, LockKind, PendingSignal,
    QueueEntry, Tick,
};

use crate::events::{CombatantEvent, DeferReason, Event, EventBus, TurnEvent};
use crate::strategem::Strategem;

/// Every combatant in the battle, keyed by id.
pub type Roster = BTreeMap<CombatantId, Combatant>;

/// Logic clock bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct ClockState {
    pub tick: Tick,
    pub running: bool,
    /// Wait mode halted on an ineligible head entry; the next tick retries it.
    pub retry_pending: bool,
    pub last_tick_at: Option<tokio::time::Instant>,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            tick: Tick::ZERO,
            running: true,
            retry_pending: false,
            last_tick_at: None,
        }
    }
}

/// Read-only view of one combatant, for hosts and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub alignment: Alignment,
    pub health: u32,
    pub max_health: u32,
    pub forecast_health: u32,
    pub charge: f64,
    pub is_ready: bool,
    pub is_acting: bool,
    pub is_alive: bool,
    pub is_hurt_locked: bool,
    pub is_heal_locked: bool,
    pub is_queued: bool,
}

pub struct BattleState {
    pub(crate) roster: Roster,
    pub(crate) strategems: HashMap<CombatantId, Vec<Strategem>>,
    pub(crate) queue: ActionQueue,
    pub(crate) clock: ClockState,
    /// Combatant whose player prompt is outstanding.
    pub(crate) prompt: Option<CombatantId>,
    /// Task waiting on that prompt.
    pub(crate) prompt_task: Option<AbortHandle>,
    pub(crate) rng: StdRng,
    pub(crate) events: EventBus,
}

impl BattleState {
    pub(crate) fn new(
        roster: Roster,
        strategems: HashMap<CombatantId, Vec<Strategem>>,
        rng: StdRng,
        events: EventBus,
    ) -> Self {
        Self {
            roster,
            strategems,
            queue: ActionQueue::new(),
            clock: ClockState::default(),
            prompt: None,
            prompt_task: None,
            rng,
            events,
        }
    }

    pub fn now(&self) -> Tick {
        self.clock.tick
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.get(&id)
    }

    pub(crate) fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.roster.get_mut(&id)
    }

    /// Drains every combatant's undelivered signals.
    pub(crate) fn take_pending_signals(&mut self) -> Vec<PendingSignal> {
        self.roster
            .values_mut()
            .filter(|c| c.has_pending_signals())
            .flat_map(Combatant::take_pending_signals)
            .collect()
    }

    pub(crate) fn publish(&self, event: impl Into<Event>) {
        self.events.publish(event);
    }

    pub fn snapshot(&self, id: CombatantId) -> Option<CombatantSnapshot> {
        let c = self.roster.get(&id)?;
        Some(CombatantSnapshot {
            id,
            name: c.name().to_owned(),
            alignment: c.alignment(),
            health: c.health().current(),
            max_health: c.health().max(),
            forecast_health: c.health().forecast(),
            charge: c.charge().value(),
            is_ready: c.charge().is_ready(),
            is_acting: c.is_acting(),
            is_alive: c.is_alive(),
            is_hurt_locked: c.is_hurt_locked(),
            is_heal_locked: c.is_heal_locked(),
            is_queued: self.queue.is_action_queued(id),
        })
    }

    // ========================================================================
    // Clock
    // ========================================================================

    pub(crate) fn halt_clock(&mut self) {
        if self.clock.running {
            self.clock.running = false;
            debug!(target: "battle::clock", tick = %self.clock.tick, "clock halted");
            self.publish(TurnEvent::ClockHalted {
                tick: self.clock.tick,
            });
        }
    }

    pub(crate) fn resume_clock(&mut self) {
        self.clock.retry_pending = false;
        if !self.clock.running {
            self.clock.running = true;
            debug!(target: "battle::clock", tick = %self.clock.tick, "clock resumed");
            self.publish(TurnEvent::ClockResumed {
                tick: self.clock.tick,
            });
        }
    }

    /// Drops the outstanding prompt and cancels the task waiting on it.
    pub(crate) fn abandon_prompt(&mut self) {
        if let Some(combatant) = self.prompt.take() {
            debug!(target: "battle::scheduler", %combatant, "prompt abandoned");
        }
        if let Some(task) = self.prompt_task.take() {
            task.abort();
        }
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Puts a popped entry back and reports why. Always returns false so the
    /// scheduler can `return state.defer(..)`.
    pub(crate) fn defer(&mut self, entry: QueueEntry, reason: DeferReason) -> bool {
        debug!(
            target: "battle::scheduler",
            combatant = %entry.combatant,
            %reason,
            "turn deferred"
        );
        self.queue.push_back(entry);
        self.publish(TurnEvent::Deferred {
            combatant: entry.combatant,
            reason,
        });
        false
    }

    /// Forfeits a turn; the combatant re-signals readiness on the next tick.
    pub(crate) fn rearm(&mut self, id: CombatantId) {
        if let Some(combatant) = self.roster.get_mut(&id) {
            combatant.rearm_readiness();
        }
    }

    // ========================================================================
    // Hurt / heal episodes
    // ========================================================================

    /// Takes `locker`'s key on `target` and forecasts the incoming amount.
    pub(crate) fn hold(
        &mut self,
        target: CombatantId,
        kind: LockKind,
        locker: CombatantId,
        amount: u32,
    ) -> bool {
        let Some(combatant) = self.roster.get_mut(&target) else {
            return false;
        };
        if !combatant.set_lock(kind, locker) {
            return false;
        }
        match kind {
            LockKind::Hurt => combatant.forecast_damage(amount),
            LockKind::Heal => combatant.forecast_restoration(amount),
        }
        true
    }

    /// Drops `locker`'s key and settles a death the episode was holding back.
    pub(crate) fn release(
        &mut self,
        target: CombatantId,
        kind: LockKind,
        locker: CombatantId,
    ) -> bool {
        let Some(combatant) = self.roster.get_mut(&target) else {
            return false;
        };
        let held = combatant.release_lock(kind, locker);
        self.settle_death(target);
        held
    }

    pub(crate) fn start_hurt(
        &mut self,
        target: CombatantId,
        attacker: CombatantId,
        amount: u32,
        damage_type: DamageType,
    ) -> u32 {
        let Some(combatant) = self.roster.get_mut(&target) else {
            return 0;
        };
        let taken = combatant.start_hurt(amount);
        debug!(
            target: "battle::action",
            %target,
            %attacker,
            amount = taken,
            %damage_type,
            remaining = combatant.health().current(),
            "hurt"
        );
        self.publish(CombatantEvent::Hurt {
            target,
            attacker,
            amount: taken,
            damage_type,
        });
        taken
    }

    pub(crate) fn end_hurt(&mut self, target: CombatantId, attacker: CombatantId) {
        self.publish(CombatantEvent::HurtEnded { target, attacker });
    }

    pub(crate) fn start_heal(
        &mut self,
        target: CombatantId,
        healer: CombatantId,
        amount: u32,
    ) -> u32 {
        let Some(combatant) = self.roster.get_mut(&target) else {
            return 0;
        };
        let restored = combatant.start_heal(amount);
        debug!(target: "battle::action", %target, %healer, amount = restored, "healed");
        self.publish(CombatantEvent::Healed {
            target,
            healer,
            amount: restored,
        });
        restored
    }

    pub(crate) fn end_heal(&mut self, target: CombatantId, healer: CombatantId) {
        self.publish(CombatantEvent::HealEnded { target, healer });
    }

    /// Reports a death once no episode holds the combatant any more. A dead
    /// combatant leaves the queue and never acts again.
    pub(crate) fn settle_death(&mut self, id: CombatantId) -> bool {
        let Some(combatant) = self.roster.get_mut(&id) else {
            return false;
        };
        if !combatant.settle_death() {
            return false;
        }
        info!(target: "battle::session", combatant = %id, name = combatant.name(), "died");
        self.queue.remove(id);
        self.publish(CombatantEvent::Died { combatant: id });
        true
    }
}

impl std::fmt::Debug for BattleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleState")
            .field("roster", &self.roster)
            .field("queue", &self.queue)
            .field("clock", &self.clock)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}
