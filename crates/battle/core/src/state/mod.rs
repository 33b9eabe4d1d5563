//! Combatant state owned by a battle session.
//!
//! A [`Combatant`] aggregates the pieces the scheduler reasons about: its
//! [`HealthLedger`] (current, max and forecasted health), the
//! [`InteractionLocks`] that keep damage/heal episodes from overlapping, and the
//! [`ChargeMeter`](crate::ChargeMeter) that decides when it is ready to act.

mod combatant;
mod common;
mod health;
mod locks;

pub use combatant::{Combatant, CombatantSignals, ControlMode, PendingSignal};
pub use common::{Alignment, CombatantId, Tick, WorldPosition};
pub use health::HealthLedger;
pub use locks::{InteractionLocks, LockKind};
