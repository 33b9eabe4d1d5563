use std::sync::Mutex;

use battle_core::Tick;

use crate::action::{ActionComponent, ActionInstance, ComponentKind};
use crate::api::Result;
use crate::session::BattleState;

/// Minimum number of logic ticks between two uses of an action.
#[derive(Debug)]
pub struct CooldownComponent {
    ticks: u64,
    last_used: Mutex<Option<Tick>>,
}

impl CooldownComponent {
    pub fn new(ticks: u64) -> Self {
        Self {
            ticks,
            last_used: Mutex::new(None),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_used(&self) -> Option<Tick> {
        *self
            .last_used
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn can_use(&self, now: Tick) -> bool {
        self.last_used()
            .is_none_or(|used| now.since(used) >= self.ticks)
    }

    /// Ticks left before the action is usable again.
    pub fn remaining(&self, now: Tick) -> u64 {
        self.last_used()
            .map_or(0, |used| self.ticks.saturating_sub(now.since(used)))
    }
}

impl ActionComponent for CooldownComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Cooldown
    }

    fn prepare(&self, _action: &ActionInstance, state: &mut BattleState) -> Result<()> {
        *self
            .last_used
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(state.now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_action_is_ready() {
        assert!(CooldownComponent::new(30).can_use(Tick::ZERO));
    }

    #[test]
    fn elapsed_ticks_gate_reuse() {
        let cooldown = CooldownComponent::new(30);
        *cooldown.last_used.lock().unwrap() = Some(Tick(10));

        assert!(!cooldown.can_use(Tick(39)));
        assert_eq!(cooldown.remaining(Tick(39)), 1);
        assert!(cooldown.can_use(Tick(40)));
        assert_eq!(cooldown.remaining(Tick(55)), 0);
    }
}
