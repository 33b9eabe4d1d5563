//! Deterministic combat rules for the active-time battle scheduler.
//!
//! `battle-core` owns everything about a battle that can be expressed without
//! an async runtime: combatant state (health, forecast, interaction locks),
//! the charge meter that decides readiness, condition evaluation and
//! targeting, immutable action definitions, the hit-window state machine that
//! turns frame events into hurt/heal pulses, and the priority-ordered action
//! queue. The async orchestration that drives these pieces lives in
//! `battle-runtime`.
pub mod action;
pub mod charge;
pub mod condition;
pub mod config;
pub mod error;
pub mod observable;
pub mod queue;
pub mod state;

pub use action::{
    ActionDefinition, ActionLifecycle, ActionPhase, AnimationSpec, DamageType, EffectKind,
    EffectSpec, HitSignal, HitWindow, HitWindowQueue, Potency, RangeCategory,
};
pub use charge::{ChargeMeter, ChargeState, Readiness, seed_charge_entropy};
pub use condition::{Comparator, Condition, Formation, HealthStat, Threshold, get_targets};
pub use config::{BattleConfig, ClockMode};
pub use error::{BattleError, ConfigError, ErrorSeverity, LifecycleError, TargetingError};
pub use observable::{Notification, Observable, SubscriptionId};
pub use queue::{ActionQueue, QueueEntry};
pub use state::{
    Alignment, Combatant, CombatantId, CombatantSignals, ControlMode, HealthLedger, InteractionLocks,
    LockKind, PendingSignal, Tick, WorldPosition,
};
