//! Common error infrastructure for battle-core.
//!
//! Errors are split by how the caller is expected to react:
//!
//! - [`ConfigError`]: content or wiring mistakes detected while an action is
//!   assembled. These are programmer errors in content data and are never
//!   retried.
//! - [`TargetingError`]: a condition variant that has no evaluation path.
//! - [`LifecycleError`]: an action instance was driven through an illegal
//!   phase transition.
//!
//! Transient ineligibility (a combatant that cannot act yet, targets that are
//! mid-action) is not an error at all; the scheduler handles it by pushing the
//! queue entry back.

use crate::action::ActionPhase;
use crate::state::CombatantId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,

    /// Unrecoverable setup error (broken content, missing collaborator).
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Configuration errors raised while building an action from its definition.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("action `{action}`: movement component requires a targeting component")]
    MovementWithoutTargeting { action: String },

    #[error("action `{action}`: damage/restore component requires a targeting component")]
    EffectWithoutTargeting { action: String },

    #[error("action `{action}`: projectile visual could not be resolved")]
    UnresolvedProjectile { action: String },

    #[error("action `{action}`: hit window {index} ends (frame {end}) before it starts (frame {start})")]
    InvertedHitWindow {
        action: String,
        index: usize,
        start: u32,
        end: u32,
    },

    #[error("action `{action}`: restore effects support a single frame window, found {count}")]
    TooManyRestoreWindows { action: String, count: usize },

    #[error("action `{action}`: per-hit potency lists {potencies} values for {windows} hit windows")]
    PotencyMismatch {
        action: String,
        potencies: usize,
        windows: usize,
    },

    #[error("action `{action}`: a {component} component is already registered")]
    DuplicateComponent {
        action: String,
        component: &'static str,
    },

    #[error("combatant {combatant}: charge rate {rate} must be positive and finite")]
    InvalidChargeRate { combatant: CombatantId, rate: f64 },

    #[error("combatant {combatant}: max health must be positive")]
    InvalidMaxHealth { combatant: CombatantId },
}

impl BattleError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MovementWithoutTargeting { .. } => "MOVEMENT_WITHOUT_TARGETING",
            Self::EffectWithoutTargeting { .. } => "EFFECT_WITHOUT_TARGETING",
            Self::UnresolvedProjectile { .. } => "UNRESOLVED_PROJECTILE",
            Self::InvertedHitWindow { .. } => "INVERTED_HIT_WINDOW",
            Self::TooManyRestoreWindows { .. } => "TOO_MANY_RESTORE_WINDOWS",
            Self::PotencyMismatch { .. } => "POTENCY_MISMATCH",
            Self::DuplicateComponent { .. } => "DUPLICATE_COMPONENT",
            Self::InvalidChargeRate { .. } => "INVALID_CHARGE_RATE",
            Self::InvalidMaxHealth { .. } => "INVALID_MAX_HEALTH",
        }
    }
}

/// Errors surfaced by condition evaluation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetingError {
    /// The condition variant is declared but has no evaluation path.
    #[error("`{kind}` conditions are not implemented")]
    NotImplemented { kind: &'static str },
}

impl BattleError for TargetingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "CONDITION_NOT_IMPLEMENTED"
    }
}

/// Illegal transition of an action instance's lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("illegal action phase transition {from} -> {to}")]
pub struct LifecycleError {
    pub from: ActionPhase,
    pub to: ActionPhase,
}

impl BattleError for LifecycleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "ILLEGAL_PHASE_TRANSITION"
    }
}
