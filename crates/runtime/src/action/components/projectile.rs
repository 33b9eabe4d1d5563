use async_trait::async_trait;

use battle_core::{AnimationSpec, WorldPosition};

use crate::action::{ActionComponent, ComponentKind, ExecutionContext};
use crate::api::Result;
use crate::visual::{Graphic, VisualTarget};

/// Travelling visual for ranged actions.
///
/// Fires once the owner's main animation has finished: a transient entity is
/// spawned at the centroid of the targets, plays the projectile graphic, and
/// is despawned. Hit windows of a projectile action are timed against this
/// graphic rather than the main animation.
#[derive(Debug)]
pub struct ProjectileComponent {
    graphic: Graphic,
}

impl ProjectileComponent {
    pub fn new(spec: AnimationSpec) -> Self {
        Self {
            graphic: Graphic::new(spec),
        }
    }

    pub fn graphic(&self) -> &Graphic {
        &self.graphic
    }
}

#[async_trait]
impl ActionComponent for ProjectileComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Projectile
    }

    async fn on_execute(&self, ctx: &ExecutionContext) -> Result<()> {
        if let Some(animation) = ctx.action.components().animation() {
            animation.wait_done().await;
        }

        let world = ctx.session.world();
        let impact = WorldPosition::centroid(
            ctx.action
                .locked_targets()
                .into_iter()
                .filter_map(|target| world.position_of(target)),
        )
        .unwrap_or(WorldPosition::ORIGIN);

        let entity = world.spawn_visual(impact);
        tracing::trace!(
            target: "battle::action",
            %entity,
            key = self.graphic.key(),
            "projectile spawned"
        );
        ctx.session
            .visuals()
            .play(VisualTarget::Entity(entity), &self.graphic)
            .await;
        world.despawn_visual(entity);
        Ok(())
    }
}
