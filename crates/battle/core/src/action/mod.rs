//! Static action data and the small state machines action execution runs on.
//!
//! - [`ActionDefinition`]: immutable template loaded from content
//! - [`HitWindowQueue`]: turns frame events into hurt/heal pulses
//! - [`ActionLifecycle`]: `Idle → Preparing → Before → During → After → Idle`

mod definition;
mod hit_window;
mod phase;

pub use definition::{
    ActionDefinition, AnimationSpec, DamageType, EffectKind, EffectSpec, Potency, RangeCategory,
};
pub use hit_window::{HitSignal, HitWindow, HitWindowQueue};
pub use phase::{ActionLifecycle, ActionPhase};
