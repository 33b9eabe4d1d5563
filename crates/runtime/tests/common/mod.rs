#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::broadcast;

use battle_core::{
    ActionDefinition, Alignment, AnimationSpec, BattleConfig, Combatant, CombatantId, Condition,
    ControlMode, DamageType, EffectSpec, HitWindow, Potency,
};
use battle_runtime::{ActionInstance, Event, Strategem};

pub const HERO: CombatantId = CombatantId(1);
pub const SLIME: CombatantId = CombatantId(2);
pub const BAT: CombatantId = CombatantId(3);

pub fn config() -> BattleConfig {
    BattleConfig {
        event_buffer_size: 4096,
        ..BattleConfig::new().with_tick_rate_ms(100)
    }
}

pub fn unit(id: CombatantId, alignment: Alignment, max_health: u32, rate: f64) -> Combatant {
    Combatant::new(id, format!("unit{}", id.0), alignment, max_health, rate).unwrap()
}

pub fn manual(id: CombatantId, max_health: u32, rate: f64) -> Combatant {
    unit(id, Alignment::Party, max_health, rate).with_control(ControlMode::Manual)
}

/// ctCost 175, one 12-potency hit on frames 3..=4 of an 8-frame swing.
pub fn basic_attack() -> Arc<ActionDefinition> {
    Arc::new(
        ActionDefinition::new("BasicAttack", 175.0, AnimationSpec::animated("slash", 8))
            .with_effect(EffectSpec::damage(DamageType::Physical, Potency::Scalar(12)))
            .with_hit_windows(vec![HitWindow::new(3, 4)]),
    )
}

pub fn flurry() -> Arc<ActionDefinition> {
    Arc::new(
        ActionDefinition::new("Flurry", 150.0, AnimationSpec::animated("flurry", 12))
            .with_effect(EffectSpec::damage(
                DamageType::Physical,
                Potency::PerHit(vec![20, 20, 20]),
            ))
            .with_hit_windows(vec![
                HitWindow::new(2, 3),
                HitWindow::new(5, 6),
                HitWindow::new(9, 10),
            ]),
    )
}

pub fn cure() -> Arc<ActionDefinition> {
    Arc::new(
        ActionDefinition::new("Cure", 120.0, AnimationSpec::animated("cure", 6))
            .with_effect(EffectSpec::restore(25))
            .with_hit_windows(vec![HitWindow::new(2, 3)]),
    )
}

pub fn bolt() -> Arc<ActionDefinition> {
    Arc::new(
        ActionDefinition::new("Bolt", 140.0, AnimationSpec::animated("cast", 6))
            .with_effect(EffectSpec::damage(DamageType::Lightning, Potency::Scalar(15)))
            .with_hit_windows(vec![HitWindow::new(1, 2)])
            .with_projectile(AnimationSpec::animated("bolt", 4)),
    )
}

pub fn action(
    owner: CombatantId,
    definition: Arc<ActionDefinition>,
    condition: Condition,
) -> Arc<ActionInstance> {
    ActionInstance::from_definition(owner, definition, condition).unwrap()
}

pub fn strategem(
    owner: CombatantId,
    definition: Arc<ActionDefinition>,
    condition: Condition,
) -> Strategem {
    Strategem::new(action(owner, definition, condition))
}

/// Every event received so far.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}
