//! Logic clock.
//!
//! One tick advances every living combatant's charge meter, queues the ones
//! that just filled and then polls the queue. While the clock is halted (wait
//! mode on an ineligible head, or an outstanding player prompt) meters stay
//! frozen; a halted wait-mode clock still retries the head entry every tick.

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::{BattleOutcome, BattleSession, BattleState};
use crate::events::{CombatantEvent, TurnEvent};

impl BattleSession {
    /// Advances the battle by one logic tick.
    ///
    /// Must be called from within a tokio runtime; dequeued actions are
    /// spawned onto it.
    pub fn tick(&self) {
        {
            let mut guard = self.state();
            if !guard.clock.running {
                let retry = guard.clock.retry_pending && guard.prompt.is_none();
                drop(guard);
                if retry {
                    self.poll_queued_actions();
                }
                return;
            }
            advance_charge(&mut guard);
        }
        self.poll_queued_actions();
    }

    /// Ticks at the configured rate until the battle is decided or
    /// `tick_limit` ticks have elapsed.
    pub async fn run(&self, tick_limit: Option<u64>) -> BattleOutcome {
        let mut interval = tokio::time::interval(self.config().tick_rate());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        interval.tick().await;

        info!(
            target: "battle::clock",
            tick_rate_ms = self.config().tick_rate_ms,
            mode = %self.config().clock_mode,
            "battle started"
        );

        let mut elapsed = 0u64;
        loop {
            interval.tick().await;
            self.tick();
            elapsed += 1;

            let outcome = self.outcome();
            if outcome.is_over() {
                info!(target: "battle::clock", %outcome, tick = %self.current_tick(), "battle decided");
                return outcome;
            }
            if tick_limit.is_some_and(|limit| elapsed >= limit) {
                info!(target: "battle::clock", tick = %self.current_tick(), "tick limit reached");
                return outcome;
            }
        }
    }
}

fn advance_charge(state: &mut BattleState) {
    state.clock.tick = state.clock.tick + 1;
    state.clock.last_tick_at = Some(Instant::now());
    let now = state.clock.tick;
    trace!(target: "battle::clock", tick = %now, "tick");

    let BattleState {
        roster,
        queue,
        events,
        ..
    } = state;

    for combatant in roster.values_mut().filter(|c| c.is_alive()) {
        let before = combatant.charge().value();
        let readiness = combatant.tick_charge(now);
        let id = combatant.id();

        let value = combatant.charge().value();
        if value != before {
            events.publish(CombatantEvent::CtChanged {
                combatant: id,
                value,
            });
        }

        let Some(ready) = readiness else {
            continue;
        };
        events.publish(TurnEvent::ReadyToAct {
            combatant: id,
            activation_time: ready.activation_time,
        });
        if queue.queue_action(id, ready.activation_time) {
            debug!(
                target: "battle::scheduler",
                combatant = %id,
                activation_time = ready.activation_time,
                "queued"
            );
        }
    }
}
