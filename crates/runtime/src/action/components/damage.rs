use async_trait::async_trait;

use battle_core::{CombatantId, DamageType, HitSignal, HitWindow, LockKind, Potency};

use super::effect::HitSequencer;
use crate::action::{ActionComponent, ActionInstance, ComponentKind, ExecutionContext};
use crate::api::Result;
use crate::session::BattleState;

/// Deals damage to the locked targets inside the action's hit windows.
///
/// `prepare` takes a hurt lock on every target (keyed by the owner) and
/// forecasts the full potency, so other actors already see the targets as
/// doomed. The lock is released after the execution, which is also when a
/// killed target's death is reported.
#[derive(Debug)]
pub struct DamageComponent {
    owner: CombatantId,
    damage_type: DamageType,
    potency: Potency,
    hits: HitSequencer,
}

impl DamageComponent {
    pub fn new(
        owner: CombatantId,
        damage_type: DamageType,
        potency: Potency,
        windows: Vec<HitWindow>,
    ) -> Self {
        Self {
            owner,
            damage_type,
            potency,
            hits: HitSequencer::new(LockKind::Hurt, windows),
        }
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    /// Damage one execution deals to each target.
    pub fn total(&self) -> u32 {
        self.potency.total(self.hits.window_count())
    }

    /// Targets this component currently holds a hurt lock on.
    pub fn held_targets(&self) -> Vec<CombatantId> {
        self.hits.held()
    }
}

#[async_trait]
impl ActionComponent for DamageComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Damage
    }

    fn prepare(&self, action: &ActionInstance, state: &mut BattleState) -> Result<()> {
        let targets = action.locked_targets();
        self.hits.hold(state, self.owner, &targets, self.total());
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
                        HitSignal::Start { index } => {
                            state.start_hurt(
                                target,
                                self.owner,
                                self.potency.for_hit(index),
                                self.damage_type,
                            );
                        }
                        HitSignal::End { .. } => state.end_hurt(target, self.owner),
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
