//! Built-in action components.

mod animation;
mod cooldown;
mod damage;
mod effect;
mod movement;
mod projectile;
mod restore;
mod targeting;

pub use animation::AnimationComponent;
pub use cooldown::CooldownComponent;
pub use damage::DamageComponent;
pub use movement::MovementComponent;
pub use projectile::ProjectileComponent;
pub use restore::RestoreComponent;
pub use targeting::TargetStrategy;
