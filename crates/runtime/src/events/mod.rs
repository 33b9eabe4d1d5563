//! Topic-based event bus for battle events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need (a turn log, ATB bars, damage numbers).

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ActionEvent, CombatantEvent, DeferReason, SkipReason, TurnEvent};
