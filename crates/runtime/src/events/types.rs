//! Event types for different topics.

use battle_core::{ActionPhase, CombatantId, DamageType, Tick};

/// Why a popped queue entry was put back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeferReason {
    /// The combatant is mid-action or held by a hurt/heal episode.
    CannotAct,
    /// A combatant of the opposing alignment is acting.
    OpposingActing,
    /// A resolved target is mid-action.
    TargetActing,
    /// Every resolved target is dead or forecast to die.
    TargetsGone,
}

/// Why a turn was consumed without an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    Dead,
    /// No strategem matched and the combatant is AI-controlled.
    NoIntent,
    /// The chosen action could not start.
    BeginFailed,
}

/// Turn management and clock events.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// A combatant's meter filled.
    ReadyToAct {
        combatant: CombatantId,
        activation_time: f64,
    },
    /// A strategem action was fired.
    Started {
        combatant: CombatantId,
        action: String,
        tick: Tick,
    },
    Deferred {
        combatant: CombatantId,
        reason: DeferReason,
    },
    Skipped {
        combatant: CombatantId,
        reason: SkipReason,
    },
    PromptRequested {
        combatant: CombatantId,
    },
    PromptResolved {
        combatant: CombatantId,
        action: String,
    },
    PromptFailed {
        combatant: CombatantId,
        error: String,
    },
    ClockHalted {
        tick: Tick,
    },
    ClockResumed {
        tick: Tick,
    },
}

/// Per-combatant state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatantEvent {
    CtChanged {
        combatant: CombatantId,
        value: f64,
    },
    Hurt {
        target: CombatantId,
        attacker: CombatantId,
        amount: u32,
        damage_type: DamageType,
    },
    HurtEnded {
        target: CombatantId,
        attacker: CombatantId,
    },
    Healed {
        target: CombatantId,
        healer: CombatantId,
        amount: u32,
    },
    HealEnded {
        target: CombatantId,
        healer: CombatantId,
    },
    Died {
        combatant: CombatantId,
    },
}

/// Action lifecycle events.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEvent {
    PhaseEntered {
        owner: CombatantId,
        action: String,
        phase: ActionPhase,
    },
    Finished {
        owner: CombatantId,
        action: String,
        ct_cost: f64,
    },
    Failed {
        owner: CombatantId,
        action: String,
        error: String,
    },
}
