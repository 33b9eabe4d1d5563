use std::fmt;

use super::{Alignment, CombatantId, HealthLedger, InteractionLocks, LockKind};
use crate::charge::{ChargeMeter, Readiness};
use crate::error::ConfigError;
use crate::observable::{Notification, Observable};
use crate::state::Tick;

/// Who decides a combatant's action when no strategem applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    /// Strategems only; an unmatched turn is forfeited.
    #[default]
    Auto,
    /// Player-controlled; an unmatched turn prompts for input.
    Manual,
}

/// Reactive cells exposed to the host for ATB bars and death handling.
#[derive(Debug, Default)]
pub struct CombatantSignals {
    /// Latest charge value (`onCtChanged`).
    pub ct: Observable<f64>,
    /// Activation time of the most recent readiness (`onReadyToAct`).
    pub ready_to_act: Observable<Option<f64>>,
    /// Flips to true once, when the combatant dies (`onDied`).
    pub died: Observable<bool>,
}

/// A signal change waiting to be delivered to its subscribers.
///
/// Combatant methods never call subscribers themselves; the owner drains
/// these with [`Combatant::take_pending_signals`] and delivers them once it
/// is safe for host callbacks to run.
#[derive(Debug)]
pub enum PendingSignal {
    Ct(Notification<f64>),
    ReadyToAct(Notification<Option<f64>>),
    Died(Notification<bool>),
}

impl PendingSignal {
    pub fn deliver(self) {
        match self {
            Self::Ct(n) => n.deliver(),
            Self::ReadyToAct(n) => n.deliver(),
            Self::Died(n) => n.deliver(),
        }
    }
}

impl CombatantSignals {
    fn clear(&mut self) {
        self.ct.clear_subscribers();
        self.ready_to_act.clear_subscribers();
        self.died.clear_subscribers();
    }
}

/// A single unit on the battlefield.
///
/// Locks and health are only mutated through the methods below; the runtime's
/// damage/restore components are the only callers of the lock API.
pub struct Combatant {
    id: CombatantId,
    name: String,
    alignment: Alignment,
    control: ControlMode,
    health: HealthLedger,
    charge: ChargeMeter,
    locks: InteractionLocks,
    acting: bool,
    death_reported: bool,
    signals: CombatantSignals,
    pending: Vec<PendingSignal>,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        alignment: Alignment,
        max_health: u32,
        charge_rate: f64,
    ) -> Result<Self, ConfigError> {
        if max_health == 0 {
            return Err(ConfigError::InvalidMaxHealth { combatant: id });
        }
        Ok(Self {
            id,
            name: name.into(),
            alignment,
            control: ControlMode::Auto,
            health: HealthLedger::new(max_health),
            charge: ChargeMeter::new(id, charge_rate)?,
            locks: InteractionLocks::new(),
            acting: false,
            death_reported: false,
            signals: CombatantSignals::default(),
            pending: Vec::new(),
        })
    }

    /// Sets who decides unmatched turns (builder pattern).
    #[must_use]
    pub fn with_control(mut self, control: ControlMode) -> Self {
        self.control = control;
        self
    }

    /// Starts the combatant below full health (builder pattern).
    #[must_use]
    pub fn with_current_health(mut self, current: u32) -> Self {
        self.health = HealthLedger::with_current(current, self.health.max());
        self
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn control(&self) -> ControlMode {
        self.control
    }

    pub fn is_manual(&self) -> bool {
        self.control == ControlMode::Manual
    }

    pub fn health(&self) -> &HealthLedger {
        &self.health
    }

    pub fn charge(&self) -> &ChargeMeter {
        &self.charge
    }

    pub fn charge_mut(&mut self) -> &mut ChargeMeter {
        &mut self.charge
    }

    pub fn locks(&self) -> &InteractionLocks {
        &self.locks
    }

    pub fn signals_mut(&mut self) -> &mut CombatantSignals {
        &mut self.signals
    }

    /// Signal changes not yet delivered, oldest first.
    pub fn take_pending_signals(&mut self) -> Vec<PendingSignal> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_signals(&self) -> bool {
        !self.pending.is_empty()
    }

    fn publish_ct(&mut self) {
        if let Some(n) = self.signals.ct.set_deferred(self.charge.value()) {
            self.pending.push(PendingSignal::Ct(n));
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Alive and not projected to die from in-flight effects.
    pub fn is_targetable(&self) -> bool {
        self.health.is_alive() && !self.health.is_forecast_dead()
    }

    pub fn is_acting(&self) -> bool {
        self.acting
    }

    pub fn is_hurt_locked(&self) -> bool {
        self.locks.is_hurt_locked()
    }

    pub fn is_heal_locked(&self) -> bool {
        self.locks.is_heal_locked()
    }

    /// Alive, idle, and not mid hurt/heal episode.
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.acting && !self.locks.any()
    }

    // ========================================================================
    // Charge
    // ========================================================================

    /// Advances the charge meter by one tick and publishes the new value.
    pub fn tick_charge(&mut self, now: Tick) -> Option<Readiness> {
        let readiness = self.charge.tick(now);
        self.publish_ct();
        if let Some(n) = readiness.and_then(|ready| {
            self.signals
                .ready_to_act
                .emit_deferred(Some(ready.activation_time))
        }) {
            self.pending.push(PendingSignal::ReadyToAct(n));
        }
        readiness
    }

    /// Forfeits a turn: the full meter re-signals readiness on the next tick.
    pub fn rearm_readiness(&mut self) {
        self.charge.rearm();
    }

    /// Overwrites the initial charge (entropy seeding).
    pub fn seed_charge(&mut self, value: f64) {
        self.charge.seed(value);
        self.publish_ct();
    }

    // ========================================================================
    // Action bracket
    // ========================================================================

    /// Marks the start of an action. Returns false if already acting.
    pub fn begin_action(&mut self) -> bool {
        if self.acting {
            return false;
        }
        self.acting = true;
        true
    }

    /// End-of-action hook: clears `is_acting` and pays the action's cost.
    pub fn end_action(&mut self, ct_cost: f64) {
        self.acting = false;
        self.charge.consume(ct_cost);
        self.publish_ct();
    }

    // ========================================================================
    // Locks and forecast
    // ========================================================================

    /// Adds `locker`'s key to the given lock set.
    pub fn set_lock(&mut self, kind: LockKind, locker: CombatantId) -> bool {
        self.locks.acquire(kind, locker)
    }

    /// Removes `locker`'s key. When no hurt or heal key remains the forecast is
    /// reconciled with actual health.
    ///
    /// Returns true if `locker` held a key.
    pub fn release_lock(&mut self, kind: LockKind, locker: CombatantId) -> bool {
        let held = self.locks.release(kind, locker);
        if !self.locks.any() {
            self.health.reconcile();
        }
        held
    }

    pub fn set_hurt_lock(&mut self, locker: CombatantId) -> bool {
        self.set_lock(LockKind::Hurt, locker)
    }

    pub fn release_hurt_lock(&mut self, locker: CombatantId) -> bool {
        self.release_lock(LockKind::Hurt, locker)
    }

    pub fn set_heal_lock(&mut self, locker: CombatantId) -> bool {
        self.set_lock(LockKind::Heal, locker)
    }

    pub fn release_heal_lock(&mut self, locker: CombatantId) -> bool {
        self.release_lock(LockKind::Heal, locker)
    }

    pub fn forecast_damage(&mut self, amount: u32) {
        self.health.forecast_damage(amount);
    }

    pub fn forecast_restoration(&mut self, amount: u32) {
        self.health.forecast_restoration(amount);
    }

    /// Snaps forecast back to actual health if no lock is outstanding.
    pub fn reconcile_forecasted_health(&mut self) -> bool {
        if self.locks.any() {
            return false;
        }
        self.health.reconcile();
        true
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Start of a hurt pulse: applies damage and returns the amount taken.
    pub fn start_hurt(&mut self, amount: u32) -> u32 {
        self.health.apply_damage(amount)
    }

    /// Start of a heal pulse: applies restoration and returns the amount restored.
    pub fn start_heal(&mut self, amount: u32) -> u32 {
        self.health.apply_restoration(amount)
    }

    /// Reports death once health is gone and no episode still holds the
    /// combatant. Returns true exactly once per combatant.
    pub fn settle_death(&mut self) -> bool {
        if self.death_reported || self.is_alive() || self.locks.any() {
            return false;
        }
        self.death_reported = true;
        if let Some(n) = self.signals.died.set_deferred(true) {
            self.pending.push(PendingSignal::Died(n));
        }
        true
    }

    pub fn is_death_reported(&self) -> bool {
        self.death_reported
    }

    /// Releases every lock and observable subscription. Used when the
    /// combatant is removed from the roster. Undelivered signals are dropped.
    pub fn teardown(&mut self) {
        self.locks.clear();
        self.health.reconcile();
        self.signals.clear();
        self.pending.clear();
    }
}

impl fmt::Debug for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("alignment", &self.alignment)
            .field("control", &self.control)
            .field("health", &self.health)
            .field("charge", &self.charge.value())
            .field("acting", &self.acting)
            .field("locks", &self.locks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(max: u32) -> Combatant {
        Combatant::new(CombatantId(1), "Knight", Alignment::Party, max, 10.0).unwrap()
    }

    #[test]
    fn zero_health_is_rejected() {
        assert!(Combatant::new(CombatantId(1), "Ghost", Alignment::Enemy, 0, 10.0).is_err());
    }

    #[test]
    fn cannot_act_while_locked_or_acting() {
        let mut c = unit(40);
        assert!(c.can_act());

        c.set_hurt_lock(CombatantId(9));
        assert!(!c.can_act());
        c.release_hurt_lock(CombatantId(9));

        assert!(c.begin_action());
        assert!(!c.begin_action());
        assert!(!c.can_act());
        c.end_action(0.0);
        assert!(c.can_act());
    }

    #[test]
    fn forecast_reconciles_when_last_lock_releases() {
        let mut c = unit(40);
        c.set_hurt_lock(CombatantId(2));
        c.set_hurt_lock(CombatantId(3));
        c.forecast_damage(30);

        c.release_hurt_lock(CombatantId(2));
        assert_eq!(c.health().forecast(), 10);

        c.release_hurt_lock(CombatantId(3));
        assert_eq!(c.health().forecast(), 40);
    }

    #[test]
    fn death_waits_for_locks() {
        let mut c = unit(10);
        c.set_hurt_lock(CombatantId(2));
        c.start_hurt(25);
        assert!(!c.is_alive());
        assert!(!c.settle_death());

        c.release_hurt_lock(CombatantId(2));
        assert!(c.settle_death());
        assert!(!c.settle_death());
        assert!(*c.signals_mut().died.get());
    }

    #[test]
    fn signals_wait_until_delivered() {
        use std::sync::{Arc, Mutex};

        let mut c = unit(10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        c.signals_mut()
            .ready_to_act
            .subscribe(move |t| sink.lock().unwrap().push(*t));

        for tick in 1..=10 {
            c.tick_charge(Tick(tick));
        }
        assert!(seen.lock().unwrap().is_empty());
        assert!(c.has_pending_signals());

        for signal in c.take_pending_signals() {
            signal.deliver();
        }
        assert_eq!(*seen.lock().unwrap(), vec![Some(10.0)]);
        assert!(!c.has_pending_signals());
    }

    #[test]
    fn unobserved_changes_queue_nothing() {
        let mut c = unit(10);
        c.seed_charge(50.0);
        c.start_hurt(10);
        c.settle_death();
        assert!(!c.has_pending_signals());
    }

    #[test]
    fn end_action_pays_cost() {
        let mut c = unit(40);
        c.seed_charge(100.0);
        c.begin_action();
        c.end_action(175.0);
        assert_eq!(c.charge().value(), 0.0);
        assert!(!c.is_acting());
    }
}
