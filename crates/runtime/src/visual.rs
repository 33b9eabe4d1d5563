//! Visual handles shared between action components and the host renderer.
//!
//! A [`Graphic`] is the runtime side of an [`AnimationSpec`]: the host plays it
//! through a [`VisualPlayer`](crate::api::VisualPlayer) and reports progress
//! by emitting frame events, which the damage/restore components consume to
//! time their hit windows.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use battle_core::{AnimationSpec, CombatantId};

/// Frame progress of a playing visual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    Frame(u32),
    Finished,
}

/// Identifier of a transient visual entity (projectiles, cues) spawned in the
/// world by the placement collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualEntityId(pub u64);

impl fmt::Display for VisualEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fx{}", self.0)
    }
}

/// What a visual is played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualTarget {
    Combatant(CombatantId),
    Entity(VisualEntityId),
}

/// A playable visual with a frame event stream.
#[derive(Clone, Debug)]
pub struct Graphic {
    spec: Arc<AnimationSpec>,
    frames: broadcast::Sender<FrameEvent>,
}

impl Graphic {
    pub fn new(spec: AnimationSpec) -> Self {
        // Room for every frame plus the terminal event, so a subscriber that
        // falls behind within one playback never lags.
        let capacity = spec.frame_count.unwrap_or(0) as usize + 2;
        let (frames, _) = broadcast::channel(capacity);
        Self {
            spec: Arc::new(spec),
            frames,
        }
    }

    pub fn key(&self) -> &str {
        &self.spec.key
    }

    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    pub fn frame_count(&self) -> Option<u32> {
        self.spec.frame_count
    }

    pub fn is_frame_addressable(&self) -> bool {
        self.spec.is_frame_addressable()
    }

    /// Frame stream for the next playback. `None` for static visuals, which
    /// never emit frames.
    pub fn subscribe_frames(&self) -> Option<broadcast::Receiver<FrameEvent>> {
        self.is_frame_addressable().then(|| self.frames.subscribe())
    }

    /// Called by the player for every frame shown.
    pub fn emit_frame(&self, frame: u32) {
        // No subscribers is normal for visuals that carry no hit windows.
        let _ = self.frames.send(FrameEvent::Frame(frame));
    }

    /// Called by the player once playback has ended.
    pub fn finish(&self) {
        let _ = self.frames.send(FrameEvent::Finished);
    }
}
