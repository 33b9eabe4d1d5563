use async_trait::async_trait;

use battle_core::{CombatantId, HitSignal, HitWindow, LockKind};

use super::effect::HitSequencer;
use crate::action::{ActionComponent, ActionInstance, ComponentKind, ExecutionContext};
use crate::api::Result;
use crate::session::BattleState;

/// Restores health to the locked targets in a single frame window.
///
/// Mirrors [`DamageComponent`](super::DamageComponent) with heal locks.
/// Restoration never revives a dead target.
#[derive(Debug)]
pub struct RestoreComponent {
    owner: CombatantId,
    potency: u32,
    hits: HitSequencer,
}

impl RestoreComponent {
    pub fn new(owner: CombatantId, potency: u32, window: HitWindow) -> Self {
        Self {
            owner,
            potency,
            hits: HitSequencer::new(LockKind::Heal, vec![window]),
        }
    }

    pub fn potency(&self) -> u32 {
        self.potency
    }

    pub fn held_targets(&self) -> Vec<CombatantId> {
        self.hits.held()
    }
}

#[async_trait]
impl ActionComponent for RestoreComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Restore
    }

    fn prepare(&self, action: &ActionInstance, state: &mut BattleState) -> Result<()> {
        let targets = action.locked_targets();
        self.hits.hold(state, self.owner, &targets, self.potency);
        Ok(())
    }

    async fn before_execute(&self, ctx: &ExecutionContext) -> Result<()> {
        self.hits.subscribe(ctx.action.effect_graphic().as_ref());
        Ok(())
    }

    async fn on_execute(&self, ctx: &ExecutionContext) -> Result<()> {
        let targets = self.hits.held();
        self.hits
            .drive(|signal| {
                let mut state = ctx.session.state();
                for &target in &targets {
                    match signal {
                        HitSignal::Start { .. } => {
                            state.start_heal(target, self.owner, self.potency);
                        }
                        HitSignal::End { .. } => state.end_heal(target, self.owner),
                    }
                }
            })
            .await;
        Ok(())
    }

    async fn after_executed(&self, ctx: &ExecutionContext) -> Result<()> {
        let mut state = ctx.session.state();
        self.hits.release(&mut state, self.owner);
        Ok(())
    }

    fn cleanup(&self, _action: &ActionInstance, state: &mut BattleState) {
        self.hits.clear_subscription();
        self.hits.release(state, self.owner);
    }
}
