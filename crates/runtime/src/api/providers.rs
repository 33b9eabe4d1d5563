//! Asynchronous seams to the host.
//!
//! The session never renders, positions, or reads input itself. Hosts plug in
//! implementations of these traits; [`crate::api::headless`] provides
//! renderer-free ones for tests and simulations.
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{CombatantId, WorldPosition};

use super::errors::Result;
use crate::action::ActionInstance;
use crate::visual::{Graphic, VisualEntityId, VisualTarget};

/// Plays visuals and reports their frames.
#[async_trait]
pub trait VisualPlayer: Send + Sync {
    /// Plays `graphic` on `target`.
    ///
    /// Implementations call [`Graphic::emit_frame`] for every frame shown and
    /// [`Graphic::finish`] at the end. The future resolves when playback is
    /// over; static visuals resolve immediately.
    async fn play(&self, target: VisualTarget, graphic: &Graphic);
}

/// World-space queries and actor movement.
#[async_trait]
pub trait WorldPlacement: Send + Sync {
    fn position_of(&self, combatant: CombatantId) -> Option<WorldPosition>;

    /// Spawns a transient visual entity (e.g. a projectile) at `position`.
    fn spawn_visual(&self, position: WorldPosition) -> VisualEntityId;

    fn despawn_visual(&self, entity: VisualEntityId);

    /// Moves a combatant's actor; resolves on arrival.
    async fn move_actor(&self, combatant: CombatantId, destination: WorldPosition);
}

/// A manual combatant's turn, handed to the player.
#[derive(Clone)]
pub struct PromptRequest {
    pub combatant: CombatantId,
    /// The combatant's strategem actions, in priority order. The player may
    /// return one of these or any other instance owned by the combatant.
    pub available: Vec<Arc<ActionInstance>>,
}

impl std::fmt::Debug for PromptRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRequest")
            .field("combatant", &self.combatant)
            .field(
                "available",
                &self.available.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Source of player decisions for manual combatants.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Scripted choices
/// - Testing fixtures
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Waits for the player to pick an action for `request.combatant`.
    async fn prompt_action(&self, request: PromptRequest) -> Result<Arc<ActionInstance>>;
}
