//! Turn scheduling.
//!
//! [`BattleSession::unqueue_action`] pops the head of the queue and decides
//! whether that combatant acts now. Transient ineligibility puts the entry
//! back in its slot; the decision is retried on a later poll.
//!
//! Action ordering:
//! 1. Cross-alignment exclusion: nobody starts while a combatant of the
//!    opposing alignment is acting.
//! 2. Intent is re-evaluated at dequeue time, never cached from readiness.
//! 3. Targets are locked synchronously when the action begins, before any
//!    other combatant can be dequeued.

use std::sync::Arc;

use tracing::{debug, info, warn};

use battle_core::{ClockMode, Combatant, CombatantId};

use super::{BattleSession, BattleState};
use crate::action::{self, ActionInstance, Precondition};
use crate::api::{PromptRequest, Result, RuntimeError};
use crate::events::{DeferReason, SkipReason, TurnEvent};
use crate::strategem::select_intent;
use crate::visual::VisualTarget;

impl BattleSession {
    /// Tries to start the next turn.
    ///
    /// In wait mode one entry is attempted; if it cannot go, the clock halts
    /// and the same entry is retried on the next tick. In active mode entries
    /// are dequeued until one has to wait, and the clock never halts.
    pub fn poll_queued_actions(&self) {
        match self.config().clock_mode {
            ClockMode::Wait => {
                {
                    let mut state = self.state();
                    if state.prompt.is_some() {
                        return;
                    }
                    if state.queue.is_empty() {
                        state.resume_clock();
                        return;
                    }
                }

                let consumed = self.unqueue_action();

                let mut state = self.state();
                if consumed {
                    if state.prompt.is_none() {
                        state.resume_clock();
                    }
                } else {
                    state.clock.retry_pending = true;
                    state.halt_clock();
                }
            }
            ClockMode::Active => {
                let attempts = self.state().queue.len();
                for _ in 0..attempts {
                    if self.is_prompt_outstanding() || !self.unqueue_action() {
                        break;
                    }
                }
            }
        }
    }

    /// Pops the head entry and acts on it.
    ///
    /// Returns true if the entry was consumed (the combatant acted, was
    /// prompted, forfeited, or is gone) and false if it was put back.
    pub fn unqueue_action(&self) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;

        let Some(entry) = state.queue.pop_next() else {
            return false;
        };
        let id = entry.combatant;

        let Some(combatant) = state.roster.get(&id) else {
            debug!(target: "battle::scheduler", combatant = %id, "dropping entry of removed combatant");
            return true;
        };
        if !combatant.is_alive() {
            state.publish(TurnEvent::Skipped {
                combatant: id,
                reason: SkipReason::Dead,
            });
            return true;
        }
        if !combatant.can_act() {
            return state.defer(entry, DeferReason::CannotAct);
        }

        let opposing = combatant.alignment().opposing();
        let manual = combatant.is_manual();
        if state
            .roster
            .values()
            .any(|c| c.id() != id && c.alignment() == opposing && c.is_acting())
        {
            return state.defer(entry, DeferReason::OpposingActing);
        }

        let intent = {
            let BattleState {
                strategems,
                roster,
                rng,
                clock,
                ..
            } = &mut *state;
            strategems
                .get(&id)
                .and_then(|list| select_intent(list, roster.values(), rng, clock.tick))
        };

        let Some(action) = intent else {
            if manual {
                self.request_prompt(state, id);
            } else {
                debug!(target: "battle::scheduler", combatant = %id, "no strategem matched");
                state.rearm(id);
                state.publish(TurnEvent::Skipped {
                    combatant: id,
                    reason: SkipReason::NoIntent,
                });
            }
            return true;
        };

        let mut validated = None;
        if let Some(targeting) = action.components().targeting() {
            let targets = {
                let BattleState { roster, rng, .. } = &mut *state;
                targeting.resolve(roster.values(), rng).unwrap_or_default()
            };
            let target = |t: &CombatantId| state.roster.get(t);
            if targets.iter().any(|t| target(t).is_some_and(Combatant::is_acting)) {
                return state.defer(entry, DeferReason::TargetActing);
            }
            if !targets.iter().any(|t| target(t).is_some_and(Combatant::is_targetable)) {
                return state.defer(entry, DeferReason::TargetsGone);
            }
            validated = Some(targets);
        }

        // Execute against exactly the targets validated here.
        if let Err(err) = action.begin_against(state, validated) {
            warn!(
                target: "battle::scheduler",
                combatant = %id,
                action = action.name(),
                error = %err,
                "action could not begin"
            );
            state.rearm(id);
            state.publish(TurnEvent::Skipped {
                combatant: id,
                reason: SkipReason::BeginFailed,
            });
            return true;
        }

        info!(
            target: "battle::scheduler",
            combatant = %id,
            action = action.name(),
            targets = ?action.locked_targets(),
            tick = %state.now(),
            "turn started"
        );
        state.publish(TurnEvent::Started {
            combatant: id,
            action: action.name().to_owned(),
            tick: state.now(),
        });

        let precondition = self.intent_precondition(id);
        drop(guard);
        self.spawn_action(action, precondition);
        true
    }

    /// Visual cue played on the actor before a strategem action fires.
    fn intent_precondition(&self, combatant: CombatantId) -> Precondition {
        if !self.config().intent_cue {
            return action::ready();
        }
        let visuals = Arc::clone(self.visuals());
        let cue = self.inner.intent_cue.clone();
        Box::pin(async move {
            visuals.play(VisualTarget::Combatant(combatant), &cue).await;
        })
    }

    /// Halts the clock and hands the turn to the player.
    ///
    /// The charge meter is left as it is: the chosen action pays its cost when
    /// it finishes, and a failed prompt re-arms readiness.
    fn request_prompt(&self, state: &mut BattleState, combatant: CombatantId) {
        state.prompt = Some(combatant);
        state.halt_clock();
        info!(target: "battle::scheduler", %combatant, "awaiting player input");
        state.publish(TurnEvent::PromptRequested { combatant });

        let available = state
            .strategems
            .get(&combatant)
            .map(|list| list.iter().map(|s| Arc::clone(s.action())).collect())
            .unwrap_or_default();

        let session = self.clone();
        let task = self.spawn_task(async move {
            session.resolve_prompt(combatant, available).await;
        });
        state.prompt_task = Some(task);
    }

    /// Starts a player-chosen action, refusing it if its targeting finds
    /// nobody to act on.
    fn begin_chosen(&self, combatant: CombatantId, action: &ActionInstance) -> Result<()> {
        if action.owner() != combatant {
            return Err(RuntimeError::PromptOwnerMismatch {
                combatant,
                owner: action.owner(),
            });
        }

        let mut guard = self.state();
        let state = &mut *guard;
        let targets = match action.components().targeting() {
            Some(targeting) => {
                let BattleState { roster, rng, .. } = &mut *state;
                let targets = targeting.resolve(roster.values(), rng)?;
                if !targets
                    .iter()
                    .any(|t| roster.get(t).is_some_and(Combatant::is_targetable))
                {
                    return Err(RuntimeError::NoTargets {
                        combatant,
                        action: action.name().to_owned(),
                    });
                }
                Some(targets)
            }
            None => None,
        };
        action.begin_against(state, targets)
    }

    async fn resolve_prompt(&self, combatant: CombatantId, available: Vec<Arc<ActionInstance>>) {
        let chosen = match self.prompt_provider(combatant) {
            Some(provider) => {
                provider
                    .prompt_action(PromptRequest {
                        combatant,
                        available,
                    })
                    .await
            }
            None => Err(RuntimeError::PromptNotConfigured { combatant }),
        };

        let started = chosen.and_then(|action| {
            self.begin_chosen(combatant, &action)?;
            Ok(action)
        });

        match started {
            Ok(action) => {
                info!(
                    target: "battle::scheduler",
                    %combatant,
                    action = action.name(),
                    "player action chosen"
                );
                self.events().publish(TurnEvent::PromptResolved {
                    combatant,
                    action: action.name().to_owned(),
                });
                self.spawn_action(action, action::ready());
            }
            Err(err) => {
                warn!(target: "battle::scheduler", %combatant, error = %err, "prompt failed");
                let mut state = self.state();
                state.rearm(combatant);
                state.publish(TurnEvent::PromptFailed {
                    combatant,
                    error: err.to_string(),
                });
            }
        }

        tokio::time::sleep(self.config().prompt_debounce()).await;

        let mut state = self.state();
        if state.prompt == Some(combatant) {
            state.prompt = None;
            state.prompt_task = None;
            state.resume_clock();
        }
    }
}
