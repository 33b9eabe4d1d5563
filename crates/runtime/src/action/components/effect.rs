//! Shared hit sequencing for the damage and restore components.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError};

use battle_core::{CombatantId, HitSignal, HitWindow, HitWindowQueue, LockKind};

use crate::session::BattleState;
use crate::visual::{FrameEvent, Graphic};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lock bookkeeping and frame-driven window sequencing for one effect.
#[derive(Debug)]
pub(crate) struct HitSequencer {
    lock_kind: LockKind,
    windows: Vec<HitWindow>,
    frames: Mutex<Option<broadcast::Receiver<FrameEvent>>>,
    held: Mutex<Vec<CombatantId>>,
}

impl HitSequencer {
    pub(crate) fn new(lock_kind: LockKind, windows: Vec<HitWindow>) -> Self {
        Self {
            lock_kind,
            windows,
            frames: Mutex::new(None),
            held: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Takes the owner's key on every target and forecasts `amount`.
    pub(crate) fn hold(
        &self,
        state: &mut BattleState,
        owner: CombatantId,
        targets: &[CombatantId],
        amount: u32,
    ) {
        let mut held = lock(&self.held);
        for &target in targets {
            if state.hold(target, self.lock_kind, owner, amount) {
                held.push(target);
            }
        }
    }

    /// Targets currently held by this effect.
    pub(crate) fn held(&self) -> Vec<CombatantId> {
        lock(&self.held).clone()
    }

    /// Releases every key still held. Safe to call twice.
    pub(crate) fn release(&self, state: &mut BattleState, owner: CombatantId) {
        let held = std::mem::take(&mut *lock(&self.held));
        for target in held {
            state.release(target, self.lock_kind, owner);
        }
    }

    /// Subscribes to the frames of the visual the windows are timed against.
    pub(crate) fn subscribe(&self, graphic: Option<&Graphic>) {
        *lock(&self.frames) = graphic.and_then(Graphic::subscribe_frames);
    }

    pub(crate) fn clear_subscription(&self) {
        lock(&self.frames).take();
    }

    /// Feeds frames into the window queue until every window has closed.
    ///
    /// If the visual ends (or never emits frames) before all windows were
    /// visited, the rest fire at once.
    pub(crate) async fn drive(&self, mut on_signal: impl FnMut(HitSignal)) {
        let mut queue = HitWindowQueue::new(self.windows.iter().copied());
        let receiver = lock(&self.frames).take();

        if let Some(mut receiver) = receiver {
            while !queue.is_done() {
                match receiver.recv().await {
                    Ok(FrameEvent::Frame(frame)) => {
                        queue.on_frame(frame).into_iter().for_each(&mut on_signal);
                    }
                    Ok(FrameEvent::Finished) | Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: "battle::action", skipped, "frame stream lagged");
                    }
                }
            }
        }

        queue.flush().into_iter().for_each(&mut on_signal);
    }
}
