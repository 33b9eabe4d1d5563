use std::sync::Arc;

use battle_core::{ActionDefinition, CombatantId, Condition, ConfigError, EffectKind, HitWindow};

use super::components::{
    AnimationComponent, CooldownComponent, DamageComponent, MovementComponent,
    ProjectileComponent, RestoreComponent, TargetStrategy,
};
use super::{ActionComponent, ActionInstance, ComponentKind, ComponentSet};

/// Assembles an [`ActionInstance`] component by component.
///
/// Wiring mistakes (a second component of a kind, movement or effects without
/// targeting, an unresolvable projectile) are reported as [`ConfigError`]s
/// at the call that introduces them.
pub struct ActionBuilder {
    owner: CombatantId,
    definition: Arc<ActionDefinition>,
    components: ComponentSet,
}

impl std::fmt::Debug for ActionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBuilder")
            .field("owner", &self.owner)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl ActionBuilder {
    pub(crate) fn new(owner: CombatantId, definition: Arc<ActionDefinition>) -> Self {
        Self {
            owner,
            definition,
            components: ComponentSet::default(),
        }
    }

    fn ensure_absent(&self, kind: ComponentKind) -> Result<(), ConfigError> {
        if self.components.contains(kind) {
            return Err(ConfigError::DuplicateComponent {
                action: self.definition.name.clone(),
                component: kind.as_str(),
            });
        }
        Ok(())
    }

    pub fn targeting(mut self, condition: Condition) -> Result<Self, ConfigError> {
        self.ensure_absent(ComponentKind::Targeting)?;
        self.components.targeting = Some(Arc::new(TargetStrategy::new(
            condition,
            self.definition.target_ct,
        )));
        Ok(self)
    }

    pub fn animation(mut self) -> Result<Self, ConfigError> {
        self.ensure_absent(ComponentKind::Animation)?;
        self.components.animation = Some(Arc::new(AnimationComponent::new(
            self.owner,
            self.definition.animation.clone(),
        )));
        Ok(self)
    }

    /// Requires a targeting component to already be present.
    pub fn movement(mut self) -> Result<Self, ConfigError> {
        self.ensure_absent(ComponentKind::Movement)?;
        if self.components.targeting.is_none() {
            return Err(ConfigError::MovementWithoutTargeting {
                action: self.definition.name.clone(),
            });
        }
        self.components.movement = Some(Arc::new(MovementComponent::new(self.owner)));
        Ok(self)
    }

    pub fn projectile(mut self) -> Result<Self, ConfigError> {
        self.ensure_absent(ComponentKind::Projectile)?;
        let spec = self
            .definition
            .projectile
            .clone()
            .filter(|spec| spec.is_frame_addressable())
            .ok_or_else(|| ConfigError::UnresolvedProjectile {
                action: self.definition.name.clone(),
            })?;
        self.components.projectile = Some(Arc::new(ProjectileComponent::new(spec)));
        Ok(self)
    }

    pub fn cooldown(mut self, ticks: u64) -> Result<Self, ConfigError> {
        self.ensure_absent(ComponentKind::Cooldown)?;
        self.components.cooldown = Some(Arc::new(CooldownComponent::new(ticks)));
        Ok(self)
    }

    /// Adds the damage or restore component the definition's effect calls
    /// for. A definition without an effect adds nothing.
    pub fn effect(mut self) -> Result<Self, ConfigError> {
        let Some(effect) = self.definition.effect.clone() else {
            return Ok(self);
        };
        if self.components.targeting.is_none() {
            return Err(ConfigError::EffectWithoutTargeting {
                action: self.definition.name.clone(),
            });
        }
        let windows = self.definition.effective_hit_windows();

        match effect.kind {
            EffectKind::Damage => {
                self.ensure_absent(ComponentKind::Damage)?;
                self.components.damage = Some(Arc::new(DamageComponent::new(
                    self.owner,
                    effect.damage_type,
                    effect.potency,
                    windows,
                )));
            }
            EffectKind::Restore => {
                self.ensure_absent(ComponentKind::Restore)?;
                let window = windows.first().copied().unwrap_or(HitWindow::new(0, 0));
                self.components.restore = Some(Arc::new(RestoreComponent::new(
                    self.owner,
                    effect.potency.for_hit(0),
                    window,
                )));
            }
        }
        Ok(self)
    }

    /// Adds a host-defined component. Any number may be added; they run in
    /// priority order alongside the built-in ones.
    #[must_use]
    pub fn component(mut self, component: Arc<dyn ActionComponent>) -> Self {
        self.components.custom.push(component);
        self
    }

    /// Validates the definition and produces the instance.
    pub fn build(self) -> Result<Arc<ActionInstance>, ConfigError> {
        self.definition.validate()?;
        Ok(Arc::new(ActionInstance::from_parts(
            self.owner,
            self.definition,
            self.components,
        )))
    }
}
