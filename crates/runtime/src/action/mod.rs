//! Live action instances.
//!
//! An [`ActionInstance`] binds an immutable [`ActionDefinition`] to an owner and
//! a set of components. Executing it runs the components through a fixed
//! lifecycle:
//!
//! ```text
//! begin:   mark owner acting, prepare() every component     (sync, locked)
//! run:     await precondition
//!          Before  -> before_execute() on all, concurrently
//!          During  -> on_execute() on all, concurrently
//!          After   -> after_executed() on all, concurrently
//! finish:  cleanup(), end-of-action cost, back to Idle      (always)
//! ```
//!
//! `finish` runs even when a phase fails, so the owner is never left acting
//! and no hurt/heal lock outlives its execution.

mod builder;
mod component;
pub mod components;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, warn};

use battle_core::{ActionDefinition, ActionLifecycle, ActionPhase, CombatantId, Condition};

pub use builder::ActionBuilder;
pub use component::{ActionComponent, ComponentKind, ComponentSet};

use crate::api::{Result, RuntimeError};
use crate::events::{ActionEvent, CombatantEvent};
use crate::session::{BattleSession, BattleState};
use crate::visual::Graphic;

/// Future awaited between `prepare` and the first phase (e.g. an intent cue).
pub type Precondition = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A precondition that is already satisfied.
pub fn ready() -> Precondition {
    Box::pin(std::future::ready(()))
}

/// What every component hook receives.
#[derive(Clone)]
pub struct ExecutionContext {
    pub session: BattleSession,
    pub action: Arc<ActionInstance>,
}

pub struct ActionInstance {
    owner: CombatantId,
    definition: Arc<ActionDefinition>,
    components: ComponentSet,
    lifecycle: Mutex<ActionLifecycle>,
    executing: AtomicBool,
}

impl ActionInstance {
    pub fn builder(owner: CombatantId, definition: Arc<ActionDefinition>) -> ActionBuilder {
        ActionBuilder::new(owner, definition)
    }

    /// Assembles the standard component set for a definition.
    ///
    /// Every action targets `condition` and plays its animation. Ranged
    /// actions add a projectile; melee damage adds movement to the target.
    /// The definition's effect decides between damage and restore.
    pub fn from_definition(
        owner: CombatantId,
        definition: Arc<ActionDefinition>,
        condition: Condition,
    ) -> std::result::Result<Arc<Self>, battle_core::ConfigError> {
        use battle_core::{EffectKind, RangeCategory};

        let range = definition.range;
        let effect = definition.effect.as_ref().map(|e| e.kind);
        let cooldown = definition.cooldown;

        let mut builder = Self::builder(owner, definition)
            .targeting(condition)?
            .animation()?;
        builder = match (range, effect) {
            (RangeCategory::Projectile, _) => builder.projectile()?,
            (RangeCategory::Melee, Some(EffectKind::Damage)) => builder.movement()?,
            (RangeCategory::Melee, _) => builder,
        };
        builder = builder.effect()?;
        if let Some(ticks) = cooldown {
            builder = builder.cooldown(ticks)?;
        }
        builder.build()
    }

    pub(crate) fn from_parts(
        owner: CombatantId,
        definition: Arc<ActionDefinition>,
        components: ComponentSet,
    ) -> Self {
        Self {
            owner,
            definition,
            components,
            lifecycle: Mutex::new(ActionLifecycle::new()),
            executing: AtomicBool::new(false),
        }
    }

    pub fn owner(&self) -> CombatantId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    pub fn ct_cost(&self) -> f64 {
        self.definition.ct_cost
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> ActionPhase {
        self.lifecycle().phase()
    }

    fn lifecycle(&self) -> MutexGuard<'_, ActionLifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Targets frozen by the targeting component for this execution.
    pub fn locked_targets(&self) -> Vec<CombatantId> {
        self.components
            .targeting()
            .map(|t| t.locked_targets())
            .unwrap_or_default()
    }

    /// The visual hit windows are timed against: the projectile if there is
    /// one, the main animation otherwise.
    pub fn effect_graphic(&self) -> Option<Graphic> {
        self.components
            .projectile()
            .map(|p| p.graphic().clone())
            .or_else(|| self.components.animation().map(|a| a.graphic().clone()))
    }

    /// Begins and runs the action to completion.
    pub async fn execute(
        self: &Arc<Self>,
        session: &BattleSession,
        precondition: Precondition,
    ) -> Result<()> {
        {
            let mut state = session.state();
            self.begin(&mut state)?;
        }
        self.run(session, precondition).await
    }

    /// Marks the owner acting and prepares every component.
    ///
    /// Runs under the session lock so target selection, locking and
    /// forecasting are atomic with respect to other schedulers' decisions.
    pub(crate) fn begin(&self, state: &mut BattleState) -> Result<()> {
        self.begin_against(state, None)
    }

    /// Like [`begin`](Self::begin), freezing `targets` instead of letting the
    /// targeting component resolve its own.
    ///
    /// Targets are only frozen once the owner is confirmed idle, and every
    /// failure after that point goes through `finish`, which unfreezes them.
    pub(crate) fn begin_against(
        &self,
        state: &mut BattleState,
        targets: Option<Vec<CombatantId>>,
    ) -> Result<()> {
        if self.executing.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyExecuting {
                action: self.name().to_owned(),
            });
        }

        let Some(owner) = state.combatant_mut(self.owner) else {
            self.executing.store(false, Ordering::Release);
            return Err(RuntimeError::UnknownCombatant(self.owner));
        };
        if !owner.begin_action() {
            self.executing.store(false, Ordering::Release);
            return Err(RuntimeError::AlreadyActing {
                combatant: self.owner,
            });
        }

        if let (Some(targets), Some(targeting)) = (targets, self.components.targeting()) {
            targeting.lock_targets(targets);
        }

        if let Err(err) = self.prepare_components(state) {
            self.finish(state, Some(&err));
            return Err(err);
        }
        debug!(
            target: "battle::action",
            owner = %self.owner,
            action = self.name(),
            targets = ?self.locked_targets(),
            "action prepared"
        );
        Ok(())
    }

    fn prepare_components(&self, state: &mut BattleState) -> Result<()> {
        self.lifecycle().advance(ActionPhase::Preparing)?;
        for component in self.components.ordered() {
            component.prepare(self, state)?;
        }
        Ok(())
    }

    /// Awaits the precondition, runs the three phases and finishes.
    pub(crate) async fn run(
        self: &Arc<Self>,
        session: &BattleSession,
        precondition: Precondition,
    ) -> Result<()> {
        precondition.await;
        let outcome = self.run_phases(session).await;
        {
            let mut state = session.state();
            self.finish(&mut state, outcome.as_ref().err());
        }
        outcome
    }

    async fn run_phases(self: &Arc<Self>, session: &BattleSession) -> Result<()> {
        let ctx = ExecutionContext {
            session: session.clone(),
            action: Arc::clone(self),
        };
        for phase in [ActionPhase::Before, ActionPhase::During, ActionPhase::After] {
            self.lifecycle().advance(phase)?;
            session.events().publish(ActionEvent::PhaseEntered {
                owner: self.owner,
                action: self.name().to_owned(),
                phase,
            });
            self.fan_out(phase, &ctx).await?;
        }
        Ok(())
    }

    /// Runs one hook on every component concurrently; completes once all of
    /// them have settled and reports the first failure.
    async fn fan_out(&self, phase: ActionPhase, ctx: &ExecutionContext) -> Result<()> {
        let mut set = JoinSet::new();
        for component in self.components.ordered() {
            let ctx = ctx.clone();
            set.spawn(async move {
                match phase {
                    ActionPhase::Before => component.before_execute(&ctx).await,
                    ActionPhase::During => component.on_execute(&ctx).await,
                    _ => component.after_executed(&ctx).await,
                }
            });
        }

        let mut first_error = None;
        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(RuntimeError::TaskJoin).and_then(|r| r);
            if let Err(err) = outcome {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// End-of-action bookkeeping. Runs on success and failure alike.
    fn finish(&self, state: &mut BattleState, error: Option<&RuntimeError>) {
        for component in self.components.ordered() {
            component.cleanup(self, state);
        }

        let ct_cost = self.ct_cost();
        if let Some(owner) = state.combatant_mut(self.owner) {
            owner.end_action(ct_cost);
            let value = owner.charge().value();
            state.publish(CombatantEvent::CtChanged {
                combatant: self.owner,
                value,
            });
        }
        self.lifecycle().finish();
        self.executing.store(false, Ordering::Release);

        match error {
            None => {
                debug!(
                    target: "battle::action",
                    owner = %self.owner,
                    action = self.name(),
                    ct_cost,
                    "action finished"
                );
                state.publish(ActionEvent::Finished {
                    owner: self.owner,
                    action: self.name().to_owned(),
                    ct_cost,
                });
            }
            Some(err) => {
                warn!(
                    target: "battle::action",
                    owner = %self.owner,
                    action = self.name(),
                    error = %err,
                    "action failed"
                );
                state.publish(ActionEvent::Failed {
                    owner: self.owner,
                    action: self.name().to_owned(),
                    error: err.to_string(),
                });
            }
        }
    }
}

impl std::fmt::Debug for ActionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInstance")
            .field("owner", &self.owner)
            .field("name", &self.definition.name)
            .field("components", &self.components.kinds())
            .field("phase", &self.phase())
            .finish()
    }
}
