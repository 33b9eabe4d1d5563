//! Action definitions - immutable templates loaded from content.
//!
//! A definition describes everything an action needs at runtime: its charge
//! cost, how many targets it takes, the effect it applies, the animations it
//! plays and the frame windows in which hurt/heal pulses land. Definitions are
//! loaded once and never mutated; the runtime builds one live action instance
//! per (owner, target condition) pair from them.

use super::HitWindow;
use crate::error::ConfigError;

/// Element of a damage or restore effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Ice,
    Lightning,
    Holy,
}

/// Whether an effect hurts or heals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Damage,
    Restore,
}

/// Effect strength: one value for every hit, or one value per hit window.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Potency {
    Scalar(u32),
    PerHit(Vec<u32>),
}

impl Potency {
    /// Amount dealt by hit `index`.
    pub fn for_hit(&self, index: usize) -> u32 {
        match self {
            Self::Scalar(amount) => *amount,
            Self::PerHit(amounts) => amounts.get(index).copied().unwrap_or(0),
        }
    }

    /// Total amount over `hits` hits.
    pub fn total(&self, hits: usize) -> u32 {
        (0..hits).map(|i| self.for_hit(i)).sum()
    }
}

/// Effect applied to every resolved target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub kind: EffectKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_type: DamageType,
    pub potency: Potency,
}

impl EffectSpec {
    pub fn damage(damage_type: DamageType, potency: Potency) -> Self {
        Self {
            kind: EffectKind::Damage,
            damage_type,
            potency,
        }
    }

    pub fn restore(potency: u32) -> Self {
        Self {
            kind: EffectKind::Restore,
            damage_type: DamageType::Holy,
            potency: Potency::Scalar(potency),
        }
    }
}

/// How the action reaches its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeCategory {
    #[default]
    Melee,
    Projectile,
}

/// A visual referenced by key. `frame_count: None` marks a static visual
/// that has no frame events and completes immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationSpec {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub frame_count: Option<u32>,
}

impl AnimationSpec {
    pub fn animated(key: impl Into<String>, frame_count: u32) -> Self {
        Self {
            key: key.into(),
            frame_count: Some(frame_count),
        }
    }

    pub fn still(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            frame_count: None,
        }
    }

    pub fn is_frame_addressable(&self) -> bool {
        self.frame_count.is_some_and(|n| n > 0)
    }
}

#[cfg(feature = "serde")]
fn default_target_ct() -> usize {
    1
}

/// Immutable action template.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    pub name: String,

    /// Charge subtracted from the owner's meter when the action finishes.
    pub ct_cost: f64,

    /// Number of targets taken from the ranked targeting result.
    #[cfg_attr(feature = "serde", serde(default = "default_target_ct"))]
    pub target_ct: usize,

    /// Main weapon/spell animation.
    pub animation: AnimationSpec,

    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<EffectSpec>,

    /// Frame windows for hurt/heal pulses, visited in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_windows: Vec<HitWindow>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub range: RangeCategory,

    /// Travelling visual for projectile actions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub projectile: Option<AnimationSpec>,

    /// Minimum ticks between two uses.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: Option<u64>,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>, ct_cost: f64, animation: AnimationSpec) -> Self {
        Self {
            name: name.into(),
            ct_cost,
            target_ct: 1,
            animation,
            effect: None,
            hit_windows: Vec::new(),
            range: RangeCategory::Melee,
            projectile: None,
            cooldown: None,
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effect = Some(effect);
        self
    }

    #[must_use]
    pub fn with_hit_windows(mut self, windows: Vec<HitWindow>) -> Self {
        self.hit_windows = windows;
        self
    }

    #[must_use]
    pub fn with_target_ct(mut self, target_ct: usize) -> Self {
        self.target_ct = target_ct;
        self
    }

    #[must_use]
    pub fn with_projectile(mut self, projectile: AnimationSpec) -> Self {
        self.range = RangeCategory::Projectile;
        self.projectile = Some(projectile);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, ticks: u64) -> Self {
        self.cooldown = Some(ticks);
        self
    }

    /// Hit windows, or a single window on frame 0 when none are configured.
    pub fn effective_hit_windows(&self) -> Vec<HitWindow> {
        if self.hit_windows.is_empty() {
            vec![HitWindow::new(0, 0)]
        } else {
            self.hit_windows.clone()
        }
    }

    /// Total effect amount one execution applies to each target.
    pub fn total_potency(&self) -> u32 {
        self.effect
            .as_ref()
            .map_or(0, |e| e.potency.total(self.effective_hit_windows().len()))
    }

    /// Checks internal consistency. Called when an action is assembled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, window) in self.hit_windows.iter().enumerate() {
            if window.end < window.start {
                return Err(ConfigError::InvertedHitWindow {
                    action: self.name.clone(),
                    index,
                    start: window.start,
                    end: window.end,
                });
            }
        }

        if let Some(effect) = &self.effect {
            if effect.kind == EffectKind::Restore && self.hit_windows.len() > 1 {
                return Err(ConfigError::TooManyRestoreWindows {
                    action: self.name.clone(),
                    count: self.hit_windows.len(),
                });
            }
            if let Potency::PerHit(amounts) = &effect.potency {
                let windows = self.effective_hit_windows().len();
                if amounts.len() != windows {
                    return Err(ConfigError::PotencyMismatch {
                        action: self.name.clone(),
                        potencies: amounts.len(),
                        windows,
                    });
                }
            }
        }

        if self.range == RangeCategory::Projectile
            && !self
                .projectile
                .as_ref()
                .is_some_and(AnimationSpec::is_frame_addressable)
        {
            return Err(ConfigError::UnresolvedProjectile {
                action: self.name.clone(),
            });
        }

        Ok(())
    }
}
