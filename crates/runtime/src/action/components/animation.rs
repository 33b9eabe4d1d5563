use async_trait::async_trait;
use tokio::sync::watch;

use battle_core::{AnimationSpec, CombatantId};

use crate::action::{ActionComponent, ActionInstance, ComponentKind, ExecutionContext};
use crate::api::Result;
use crate::session::BattleState;
use crate::visual::{Graphic, VisualTarget};

/// Plays the owner's main animation during the execute phase.
#[derive(Debug)]
pub struct AnimationComponent {
    owner: CombatantId,
    graphic: Graphic,
    done: watch::Sender<bool>,
}

impl AnimationComponent {
    pub fn new(owner: CombatantId, spec: AnimationSpec) -> Self {
        Self {
            owner,
            graphic: Graphic::new(spec),
            done: watch::channel(false).0,
        }
    }

    pub fn graphic(&self) -> &Graphic {
        &self.graphic
    }

    /// Resolves once the animation of the current execution has finished.
    pub async fn wait_done(&self) {
        let mut rx = self.done.subscribe();
        // The sender lives as long as `self`, so this only fails on teardown.
        let _ = rx.wait_for(|done| *done).await;
    }
}

#[async_trait]
impl ActionComponent for AnimationComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Animation
    }

    fn prepare(&self, _action: &ActionInstance, _state: &mut BattleState) -> Result<()> {
        self.done.send_replace(false);
        Ok(())
    }

    async fn on_execute(&self, ctx: &ExecutionContext) -> Result<()> {
        ctx.session
            .visuals()
            .play(VisualTarget::Combatant(self.owner), &self.graphic)
            .await;
        self.done.send_replace(true);
        Ok(())
    }

    fn cleanup(&self, _action: &ActionInstance, _state: &mut BattleState) {
        // Release anyone still waiting on a failed execution.
        self.done.send_replace(true);
    }
}
