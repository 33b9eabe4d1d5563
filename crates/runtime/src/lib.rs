//! Async runtime for the charge-time battle scheduler.
//!
//! This crate drives the pure battle model of `battle-core` in real time: a
//! logic clock fills charge meters, ready combatants are queued, and the
//! scheduler turns queue entries into action executions whose visuals and
//! hit windows play out on tokio tasks. Hosts embed a [`BattleSession`] and
//! plug in rendering, placement and player input through the traits in
//! [`api`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the session handle, clock and scheduler
//! - [`action`] holds action instances and their components
//! - [`strategem`] evaluates prioritised AI rules
//! - [`api`] exposes the host-facing traits, errors and headless collaborators
//! - [`events`] provides the topic-based event bus
pub mod action;
pub mod api;
pub mod events;
pub mod session;
pub mod strategem;
pub mod visual;

pub use action::{
    ActionBuilder, ActionComponent, ActionInstance, ComponentKind, ComponentSet,
    ExecutionContext, Precondition,
};
pub use api::{
    ChannelPrompt, FirstChoicePrompt, HeadlessVisualPlayer, PromptProvider, PromptRequest,
    PromptResponder, Result, RuntimeError, StaticWorld, VisualPlayer, WorldPlacement,
};
pub use events::{
    ActionEvent, CombatantEvent, DeferReason, Event, EventBus, SkipReason, Topic, TurnEvent,
};
pub use session::{
    BattleOutcome, BattleSession, BattleSessionBuilder, BattleState, CombatantSnapshot, Roster,
};
pub use strategem::{Strategem, select_intent};
pub use visual::{FrameEvent, Graphic, VisualEntityId, VisualTarget};
