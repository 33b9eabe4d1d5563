//! Action instance lifecycle.

use crate::error::LifecycleError;

/// Phase of one action execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ActionPhase {
    #[default]
    Idle,
    /// `prepare()` ran on every component; awaiting the precondition.
    Preparing,
    /// `before_execute` fan-out.
    Before,
    /// `on_execute` fan-out.
    During,
    /// `after_executed` fan-out.
    After,
}

impl ActionPhase {
    /// The phase that legally follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::Preparing,
            Self::Preparing => Self::Before,
            Self::Before => Self::During,
            Self::During => Self::After,
            Self::After => Self::Idle,
        }
    }
}

/// `Idle → Preparing → Before → During → After → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionLifecycle {
    phase: ActionPhase,
}

impl ActionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ActionPhase::Idle
    }

    /// Moves to `to` if it is the successor of the current phase.
    pub fn advance(&mut self, to: ActionPhase) -> Result<(), LifecycleError> {
        if self.phase.next() != to {
            return Err(LifecycleError {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Returns to idle from any phase. Used by end-of-action bookkeeping,
    /// which runs whether or not the phases completed.
    pub fn finish(&mut self) -> ActionPhase {
        std::mem::replace(&mut self.phase, ActionPhase::Idle)
    }
}
