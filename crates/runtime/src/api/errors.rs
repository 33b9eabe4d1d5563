//! Unified error types surfaced by the runtime API.
//!
//! Wraps content errors from battle-core together with failures of the
//! session's own collaborators (prompt providers, spawned action tasks) so
//! hosts can bubble them up with consistent context.
use thiserror::Error;

use battle_core::{
    BattleError, CombatantId, ConfigError, ErrorSeverity, LifecycleError, TargetingError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("combatant {0} is not in the roster")]
    UnknownCombatant(CombatantId),

    #[error("combatant {combatant} is already executing an action")]
    AlreadyActing { combatant: CombatantId },

    #[error("action `{action}` is already executing")]
    AlreadyExecuting { action: String },

    #[error("no prompt provider configured for manual combatant {combatant}")]
    PromptNotConfigured { combatant: CombatantId },

    #[error("prompt channel for combatant {combatant} closed")]
    PromptChannelClosed { combatant: CombatantId },

    #[error("combatant {combatant} has no action to choose from")]
    NoPromptOptions { combatant: CombatantId },

    #[error("action `{action}` chosen for {combatant} has no target")]
    NoTargets {
        combatant: CombatantId,
        action: String,
    },

    #[error("prompted action belongs to {owner}, not to {combatant}")]
    PromptOwnerMismatch {
        combatant: CombatantId,
        owner: CombatantId,
    },

    /// A component aborted its phase.
    #[error("component `{component}` of `{action}` failed: {reason}")]
    Component {
        action: String,
        component: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Targeting(#[from] TargetingError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("action task join failed")]
    TaskJoin(#[source] tokio::task::JoinError),
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCombatant(_)
            | Self::PromptOwnerMismatch { .. }
            | Self::NoPromptOptions { .. } => ErrorSeverity::Validation,
            Self::AlreadyActing { .. } | Self::AlreadyExecuting { .. } | Self::NoTargets { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::PromptNotConfigured { .. } | Self::PromptChannelClosed { .. } => {
                ErrorSeverity::Fatal
            }
            Self::Config(err) => err.severity(),
            Self::Targeting(err) => err.severity(),
            Self::Lifecycle(err) => err.severity(),
            Self::Component { .. } | Self::TaskJoin(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCombatant(_) => "UNKNOWN_COMBATANT",
            Self::AlreadyActing { .. } => "ALREADY_ACTING",
            Self::AlreadyExecuting { .. } => "ALREADY_EXECUTING",
            Self::PromptNotConfigured { .. } => "PROMPT_NOT_CONFIGURED",
            Self::PromptChannelClosed { .. } => "PROMPT_CHANNEL_CLOSED",
            Self::PromptOwnerMismatch { .. } => "PROMPT_OWNER_MISMATCH",
            Self::NoPromptOptions { .. } => "NO_PROMPT_OPTIONS",
            Self::NoTargets { .. } => "NO_TARGETS",
            Self::Component { .. } => "COMPONENT_FAILED",
            Self::Config(err) => err.error_code(),
            Self::Targeting(err) => err.error_code(),
            Self::Lifecycle(err) => err.error_code(),
            Self::TaskJoin(_) => "TASK_JOIN",
        }
    }
}
