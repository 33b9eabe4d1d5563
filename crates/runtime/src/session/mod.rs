//! Battle session: roster, queue, clock, and the tasks driving actions.
//!
//! [`BattleSession`] is a cheap cloneable handle. All mutable battle state sits
//! behind one mutex ([`BattleState`]); it is only ever held for synchronous
//! work and never across an await point. Combatant signal callbacks
//! (`ready_to_act`, `ct`, `died`) fire after the mutex is released, so they
//! may call back into the session. Action executions and player prompts run
//! as tasks owned by the session so `settle`/`teardown` can wait for them.

mod builder;
mod clock;
mod outcome;
mod scheduler;
mod state;

use std::collections::HashMap;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{error, info};

use battle_core::{BattleConfig, Combatant, CombatantId, PendingSignal, QueueEntry, Tick};

pub use builder::BattleSessionBuilder;
pub use outcome::BattleOutcome;
pub use state::{BattleState, CombatantSnapshot, Roster};

use crate::action::{ActionInstance, Precondition};
use crate::api::{PromptProvider, Result, VisualPlayer, WorldPlacement};
use crate::events::{Event, EventBus, Topic};
use crate::visual::Graphic;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive access to [`BattleState`].
///
/// On drop the combatants' queued signals are taken, the mutex is released
/// and only then are the signals delivered.
pub(crate) struct StateGuard<'a> {
    // Declared before `signals`: fields drop in order, so the lock is gone by
    // the time `SignalFlush` runs the callbacks.
    guard: MutexGuard<'a, BattleState>,
    signals: SignalFlush,
}

#[derive(Default)]
struct SignalFlush(Vec<PendingSignal>);

impl Drop for SignalFlush {
    fn drop(&mut self) {
        for signal in self.0.drain(..) {
            signal.deliver();
        }
    }
}

impl Deref for StateGuard<'_> {
    type Target = BattleState;

    fn deref(&self) -> &BattleState {
        &self.guard
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut BattleState {
        &mut self.guard
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.signals.0 = self.guard.take_pending_signals();
    }
}

struct SessionInner {
    config: BattleConfig,
    state: Mutex<BattleState>,
    events: EventBus,
    visuals: Arc<dyn VisualPlayer>,
    world: Arc<dyn WorldPlacement>,
    prompts: Mutex<HashMap<CombatantId, Arc<dyn PromptProvider>>>,
    intent_cue: Graphic,
    tasks: Mutex<JoinSet<()>>,
}

/// Handle to a running battle.
#[derive(Clone)]
pub struct BattleSession {
    inner: Arc<SessionInner>,
}

impl BattleSession {
    pub fn builder() -> BattleSessionBuilder {
        BattleSessionBuilder::new()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.inner.config
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe(topic)
    }

    pub(crate) fn state(&self) -> StateGuard<'_> {
        StateGuard {
            guard: lock(&self.inner.state),
            signals: SignalFlush::default(),
        }
    }

    /// Runs `f` against a consistent view of the battle.
    pub fn inspect<R>(&self, f: impl FnOnce(&BattleState) -> R) -> R {
        f(&self.state())
    }

    pub(crate) fn visuals(&self) -> &Arc<dyn VisualPlayer> {
        &self.inner.visuals
    }

    pub(crate) fn world(&self) -> &Arc<dyn WorldPlacement> {
        &self.inner.world
    }

    pub fn set_prompt_provider(&self, combatant: CombatantId, provider: Arc<dyn PromptProvider>) {
        lock(&self.inner.prompts).insert(combatant, provider);
    }

    pub(crate) fn prompt_provider(
        &self,
        combatant: CombatantId,
    ) -> Option<Arc<dyn PromptProvider>> {
        lock(&self.inner.prompts).get(&combatant).cloned()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn snapshot(&self, combatant: CombatantId) -> Option<CombatantSnapshot> {
        self.state().snapshot(combatant)
    }

    /// Mutable access to a combatant, e.g. to subscribe to its signals.
    ///
    /// Signal callbacks run without the session lock held and may query or
    /// mutate the session, but must not block on another thread that does.
    pub fn with_combatant_mut<R>(
        &self,
        combatant: CombatantId,
        f: impl FnOnce(&mut Combatant) -> R,
    ) -> Option<R> {
        self.state().combatant_mut(combatant).map(f)
    }

    pub fn current_tick(&self) -> Tick {
        self.state().now()
    }

    pub fn is_clock_running(&self) -> bool {
        self.state().clock.running
    }

    pub fn is_prompt_outstanding(&self) -> bool {
        self.state().prompt.is_some()
    }

    /// Charge for smooth ATB bars: extrapolated by the share of the current
    /// tick interval already elapsed while the clock runs.
    pub fn current_computed_ct(&self, combatant: CombatantId) -> Option<f64> {
        let tick_rate = self.config().tick_rate().as_secs_f64();
        let state = self.state();
        let progress = state
            .clock
            .last_tick_at
            .map_or(0.0, |at| at.elapsed().as_secs_f64() / tick_rate);
        state
            .combatant(combatant)
            .map(|c| c.charge().current_computed_ct(state.clock.running, progress))
    }

    pub fn outcome(&self) -> BattleOutcome {
        BattleOutcome::evaluate(self.state().roster.values())
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Queues a combatant unless it is already queued.
    pub fn queue_action(&self, combatant: CombatantId, activation_time: f64) -> bool {
        self.state().queue.queue_action(combatant, activation_time)
    }

    pub fn is_action_queued(&self, combatant: CombatantId) -> bool {
        self.state().queue.is_action_queued(combatant)
    }

    pub fn clear_queue(&self) {
        self.state().queue.clear_queue();
    }

    /// Queue entries in dequeue order.
    pub fn queued(&self) -> Vec<QueueEntry> {
        self.state().queue.iter().copied().collect()
    }

    // ========================================================================
    // Actions and tasks
    // ========================================================================

    /// Runs an action outside the queue (e.g. a scripted opener).
    pub async fn execute_action(&self, action: &Arc<ActionInstance>) -> Result<()> {
        action.execute(self, crate::action::ready()).await
    }

    pub(crate) fn spawn_task<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = lock(&self.inner.tasks);
        // Reap finished tasks so long battles don't accumulate handles.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task)
    }

    /// Runs an already begun action on its own task.
    pub(crate) fn spawn_action(&self, action: Arc<ActionInstance>, precondition: Precondition) {
        let session = self.clone();
        self.spawn_task(async move {
            // Failures are logged and published by the action itself.
            let _ = action.run(&session, precondition).await;
        });
    }

    /// Waits until every action and prompt task has completed, including
    /// tasks spawned while waiting.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *lock(&self.inner.tasks));
            if tasks.is_empty() {
                return;
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Err(err) if !err.is_cancelled() => {
                        error!(target: "battle::session", error = %err, "session task failed");
                    }
                    _ => {}
                }
            }
        }
    }

    /// Stops scheduling, abandons an unanswered player prompt, waits for
    /// in-flight actions and releases every combatant's subscriptions.
    pub async fn teardown(&self) {
        {
            let mut state = self.state();
            state.queue.clear_queue();
            state.abandon_prompt();
            state.halt_clock();
        }
        self.settle().await;

        let mut state = self.state();
        for combatant in state.roster.values_mut() {
            combatant.teardown();
        }
        info!(target: "battle::session", tick = %state.now(), "session torn down");
    }

    /// Removes a combatant from the battle (kill path or host despawn).
    ///
    /// Its queue entry, strategems, prompt provider and any prompt it is
    /// waiting on go with it. An action it is currently executing still runs
    /// to completion.
    pub fn remove_combatant(&self, combatant: CombatantId) -> Option<Combatant> {
        lock(&self.inner.prompts).remove(&combatant);
        let mut state = self.state();
        state.queue.remove(combatant);
        state.strategems.remove(&combatant);
        if state.prompt == Some(combatant) {
            state.abandon_prompt();
            state.resume_clock();
        }
        let mut removed = state.roster.remove(&combatant)?;
        removed.teardown();
        info!(target: "battle::session", %combatant, "combatant removed");
        Some(removed)
    }
}

impl std::fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleSession")
            .field("config", &self.inner.config)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}
