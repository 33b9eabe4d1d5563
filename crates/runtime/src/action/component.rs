//! Component seam of an action instance.
//!
//! An action is a bag of at most one component per [`ComponentKind`]. Every
//! execution drives all of them through the same hooks:
//!
//! 1. `prepare` (sync, under the session lock, in priority order)
//! 2. `before_execute` / `on_execute` / `after_executed`, each a concurrent
//!    fan-out that completes when every component has settled
//! 3. `cleanup` (sync, always runs)

use std::sync::Arc;

use async_trait::async_trait;

use super::components::{
    AnimationComponent, CooldownComponent, DamageComponent, MovementComponent,
    ProjectileComponent, RestoreComponent, TargetStrategy,
};
use super::{ActionInstance, ExecutionContext};
use crate::api::Result;
use crate::session::BattleState;

/// Component variants, also their default execution priority (lower first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentKind {
    Targeting,
    Cooldown,
    Movement,
    Animation,
    Projectile,
    Damage,
    Restore,
    /// Host-defined component (sound, camera, scripted effects).
    Custom,
}

impl ComponentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Targeting => "targeting",
            Self::Cooldown => "cooldown",
            Self::Movement => "movement",
            Self::Animation => "animation",
            Self::Projectile => "projectile",
            Self::Damage => "damage",
            Self::Restore => "restore",
            Self::Custom => "custom",
        }
    }

    pub const fn default_priority(self) -> i32 {
        match self {
            Self::Targeting => 0,
            Self::Cooldown => 10,
            Self::Movement => 20,
            Self::Animation => 30,
            Self::Projectile => 40,
            Self::Damage | Self::Restore => 50,
            Self::Custom => 60,
        }
    }
}

#[async_trait]
pub trait ActionComponent: Send + Sync {
    fn kind(&self) -> ComponentKind;

    fn priority(&self) -> i32 {
        self.kind().default_priority()
    }

    /// Synchronous setup. Target locks and forecasts are taken here.
    fn prepare(&self, _action: &ActionInstance, _state: &mut BattleState) -> Result<()> {
        Ok(())
    }

    async fn before_execute(&self, _ctx: &ExecutionContext) -> Result<()> {
        Ok(())
    }

    async fn on_execute(&self, _ctx: &ExecutionContext) -> Result<()> {
        Ok(())
    }

    async fn after_executed(&self, _ctx: &ExecutionContext) -> Result<()> {
        Ok(())
    }

    /// Runs at the end of every execution, including failed ones. Must be
    /// idempotent with respect to `after_executed`.
    fn cleanup(&self, _action: &ActionInstance, _state: &mut BattleState) {}
}

/// The components of one action, at most one per kind.
#[derive(Default)]
pub struct ComponentSet {
    pub(crate) targeting: Option<Arc<TargetStrategy>>,
    pub(crate) cooldown: Option<Arc<CooldownComponent>>,
    pub(crate) movement: Option<Arc<MovementComponent>>,
    pub(crate) animation: Option<Arc<AnimationComponent>>,
    pub(crate) projectile: Option<Arc<ProjectileComponent>>,
    pub(crate) damage: Option<Arc<DamageComponent>>,
    pub(crate) restore: Option<Arc<RestoreComponent>>,
    pub(crate) custom: Vec<Arc<dyn ActionComponent>>,
}

impl ComponentSet {
    pub fn targeting(&self) -> Option<&Arc<TargetStrategy>> {
        self.targeting.as_ref()
    }

    pub fn cooldown(&self) -> Option<&Arc<CooldownComponent>> {
        self.cooldown.as_ref()
    }

    pub fn movement(&self) -> Option<&Arc<MovementComponent>> {
        self.movement.as_ref()
    }

    pub fn animation(&self) -> Option<&Arc<AnimationComponent>> {
        self.animation.as_ref()
    }

    pub fn projectile(&self) -> Option<&Arc<ProjectileComponent>> {
        self.projectile.as_ref()
    }

    pub fn damage(&self) -> Option<&Arc<DamageComponent>> {
        self.damage.as_ref()
    }

    pub fn restore(&self) -> Option<&Arc<RestoreComponent>> {
        self.restore.as_ref()
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Targeting => self.targeting.is_some(),
            ComponentKind::Cooldown => self.cooldown.is_some(),
            ComponentKind::Movement => self.movement.is_some(),
            ComponentKind::Animation => self.animation.is_some(),
            ComponentKind::Projectile => self.projectile.is_some(),
            ComponentKind::Damage => self.damage.is_some(),
            ComponentKind::Restore => self.restore.is_some(),
            ComponentKind::Custom => !self.custom.is_empty(),
        }
    }

    /// Every component, sorted by priority.
    pub fn ordered(&self) -> Vec<Arc<dyn ActionComponent>> {
        fn erase<C>(c: &Option<Arc<C>>) -> Option<Arc<dyn ActionComponent>>
        where
            C: ActionComponent + 'static,
        {
            c.as_ref().map(|c| Arc::clone(c) as Arc<dyn ActionComponent>)
        }

        let mut components: Vec<Arc<dyn ActionComponent>> = [
            erase(&self.targeting),
            erase(&self.cooldown),
            erase(&self.movement),
            erase(&self.animation),
            erase(&self.projectile),
            erase(&self.damage),
            erase(&self.restore),
        ]
        .into_iter()
        .flatten()
        .chain(self.custom.iter().cloned())
        .collect();
        components.sort_by_key(|c| c.priority());
        components
    }

    pub fn kinds(&self) -> Vec<ComponentKind> {
        self.ordered().iter().map(|c| c.kind()).collect()
    }
}
