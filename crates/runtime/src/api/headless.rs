//! Renderer-free collaborators.
//!
//! Used by tests and by the demo CLI to run battles without a host engine.
//! Visual playback is simulated with `tokio::time::sleep`, so under a paused
//! test clock whole battles resolve instantly and deterministically.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use battle_core::{CombatantId, WorldPosition};

use super::errors::{Result, RuntimeError};
use super::providers::{PromptProvider, PromptRequest, VisualPlayer, WorldPlacement};
use crate::action::ActionInstance;
use crate::visual::{Graphic, VisualEntityId, VisualTarget};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plays visuals by sleeping one frame duration per frame.
#[derive(Debug)]
pub struct HeadlessVisualPlayer {
    frame_duration: Duration,
    played: Mutex<Vec<(VisualTarget, String)>>,
}

impl HeadlessVisualPlayer {
    pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(16);

    pub fn new(frame_duration: Duration) -> Self {
        Self {
            frame_duration,
            played: Mutex::new(Vec::new()),
        }
    }

    /// Every visual played so far, in start order.
    pub fn played(&self) -> Vec<(VisualTarget, String)> {
        lock(&self.played).clone()
    }

    pub fn played_keys(&self) -> Vec<String> {
        lock(&self.played).iter().map(|(_, key)| key.clone()).collect()
    }
}

impl Default for HeadlessVisualPlayer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FRAME_DURATION)
    }
}

#[async_trait]
impl VisualPlayer for HeadlessVisualPlayer {
    async fn play(&self, target: VisualTarget, graphic: &Graphic) {
        lock(&self.played).push((target, graphic.key().to_owned()));
        tracing::trace!(target: "battle::visual", key = graphic.key(), ?target, "play");

        if let Some(frames) = graphic.frame_count().filter(|_| graphic.is_frame_addressable()) {
            for frame in 0..frames {
                graphic.emit_frame(frame);
                tokio::time::sleep(self.frame_duration).await;
            }
        }
        graphic.finish();
    }
}

/// Fixed-position world. Movement teleports after an optional travel delay.
#[derive(Debug, Default)]
pub struct StaticWorld {
    positions: Mutex<HashMap<CombatantId, WorldPosition>>,
    visuals: Mutex<HashMap<VisualEntityId, WorldPosition>>,
    next_visual: AtomicU64,
    travel_time: Duration,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_travel_time(mut self, travel_time: Duration) -> Self {
        self.travel_time = travel_time;
        self
    }

    #[must_use]
    pub fn with_position(self, combatant: CombatantId, position: WorldPosition) -> Self {
        self.set_position(combatant, position);
        self
    }

    pub fn set_position(&self, combatant: CombatantId, position: WorldPosition) {
        lock(&self.positions).insert(combatant, position);
    }

    /// Transient visuals currently alive.
    pub fn live_visuals(&self) -> usize {
        lock(&self.visuals).len()
    }
}

#[async_trait]
impl WorldPlacement for StaticWorld {
    fn position_of(&self, combatant: CombatantId) -> Option<WorldPosition> {
        lock(&self.positions).get(&combatant).copied()
    }

    fn spawn_visual(&self, position: WorldPosition) -> VisualEntityId {
        let id = VisualEntityId(self.next_visual.fetch_add(1, Ordering::Relaxed));
        lock(&self.visuals).insert(id, position);
        id
    }

    fn despawn_visual(&self, entity: VisualEntityId) {
        lock(&self.visuals).remove(&entity);
    }

    async fn move_actor(&self, combatant: CombatantId, destination: WorldPosition) {
        if !self.travel_time.is_zero() {
            tokio::time::sleep(self.travel_time).await;
        }
        self.set_position(combatant, destination);
    }
}

/// Picks the first available action after a think delay.
#[derive(Debug, Default)]
pub struct FirstChoicePrompt {
    think_time: Duration,
}

impl FirstChoicePrompt {
    pub fn new(think_time: Duration) -> Self {
        Self { think_time }
    }
}

#[async_trait]
impl PromptProvider for FirstChoicePrompt {
    async fn prompt_action(&self, request: PromptRequest) -> Result<Arc<ActionInstance>> {
        if !self.think_time.is_zero() {
            tokio::time::sleep(self.think_time).await;
        }
        request
            .available
            .first()
            .cloned()
            .ok_or(RuntimeError::NoPromptOptions {
                combatant: request.combatant,
            })
    }
}

/// Prompt answered from outside through a [`PromptResponder`].
///
/// Requests are forwarded to the responder side so a UI (or a test) can see
/// what was asked and reply at its own pace.
pub struct ChannelPrompt {
    requests: mpsc::UnboundedSender<PromptRequest>,
    choices: tokio::sync::Mutex<mpsc::UnboundedReceiver<Arc<ActionInstance>>>,
}

/// Answering half of a [`ChannelPrompt`].
pub struct PromptResponder {
    requests: mpsc::UnboundedReceiver<PromptRequest>,
    choices: mpsc::UnboundedSender<Arc<ActionInstance>>,
}

impl ChannelPrompt {
    pub fn new() -> (Self, PromptResponder) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (choice_tx, choice_rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: request_tx,
                choices: tokio::sync::Mutex::new(choice_rx),
            },
            PromptResponder {
                requests: request_rx,
                choices: choice_tx,
            },
        )
    }
}

impl PromptResponder {
    /// Waits for the next prompt.
    pub async fn next_request(&mut self) -> Option<PromptRequest> {
        self.requests.recv().await
    }

    /// Sends the player's choice. Returns false if the prompt side is gone.
    pub fn respond(&self, action: Arc<ActionInstance>) -> bool {
        self.choices.send(action).is_ok()
    }
}

#[async_trait]
impl PromptProvider for ChannelPrompt {
    async fn prompt_action(&self, request: PromptRequest) -> Result<Arc<ActionInstance>> {
        let combatant = request.combatant;
        self.requests
            .send(request)
            .map_err(|_| RuntimeError::PromptChannelClosed { combatant })?;
        self.choices
            .lock()
            .await
            .recv()
            .await
            .ok_or(RuntimeError::PromptChannelClosed { combatant })
    }
}
