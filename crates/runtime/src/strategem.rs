//! Prioritised AI rules.
//!
//! A combatant's strategems are evaluated in order every time it reaches the
//! head of the queue; the first one whose action has a target and whose extra
//! conditions all match becomes the combatant's intent for that turn.

use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use battle_core::{Combatant, CombatantId, Condition, Tick, get_targets};

use crate::action::ActionInstance;

/// An (action, gating conditions) rule.
#[derive(Debug, Clone)]
pub struct Strategem {
    action: Arc<ActionInstance>,
    conditions: Vec<Condition>,
}

impl Strategem {
    pub fn new(action: Arc<ActionInstance>) -> Self {
        Self {
            action,
            conditions: Vec::new(),
        }
    }

    /// Adds a gating condition; it must resolve to at least one unit.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn owner(&self) -> CombatantId {
        self.action.owner()
    }

    pub fn action(&self) -> &Arc<ActionInstance> {
        &self.action
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True if the action is off cooldown, its targeting yields at least one
    /// target, and every gating condition yields at least one unit.
    pub fn check_activation<'a, I, R>(&self, roster: I, rng: &mut R, now: Tick) -> bool
    where
        I: IntoIterator<Item = &'a Combatant> + Clone,
        R: Rng + ?Sized,
    {
        let components = self.action.components();

        if let Some(cooldown) = components.cooldown()
            && !cooldown.can_use(now)
        {
            trace!(
                target: "battle::scheduler",
                action = self.action.name(),
                remaining = cooldown.remaining(now),
                "strategem on cooldown"
            );
            return false;
        }

        if let Some(targeting) = components.targeting() {
            match targeting.resolve(roster.clone(), rng) {
                Ok(targets) if !targets.is_empty() => {}
                Ok(_) => return false,
                Err(err) => {
                    trace!(
                        target: "battle::scheduler",
                        action = self.action.name(),
                        %err,
                        "targeting failed"
                    );
                    return false;
                }
            }
        }

        self.conditions.iter().all(|condition| {
            get_targets(condition, roster.clone(), rng).is_ok_and(|units| !units.is_empty())
        })
    }
}

/// The first strategem in `strategems` that activates.
pub fn select_intent<'a, I, R>(
    strategems: &[Strategem],
    roster: I,
    rng: &mut R,
    now: Tick,
) -> Option<Arc<ActionInstance>>
where
    I: IntoIterator<Item = &'a Combatant> + Clone,
    R: Rng + ?Sized,
{
    strategems
        .iter()
        .find(|s| s.check_activation(roster.clone(), rng, now))
        .map(|s| Arc::clone(s.action()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        ActionDefinition, Alignment, AnimationSpec, DamageType, EffectSpec, Potency,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn combatant(id: u32, alignment: Alignment, hp: u32) -> Combatant {
        Combatant::new(CombatantId(id), format!("unit{id}"), alignment, 100, 10.0)
            .unwrap()
            .with_current_health(hp)
    }

    fn action(name: &str, condition: Condition) -> Arc<ActionInstance> {
        let definition = ActionDefinition::new(name, 100.0, AnimationSpec::still(name))
            .with_effect(EffectSpec::damage(DamageType::Physical, Potency::Scalar(5)));
        ActionInstance::from_definition(CombatantId(1), Arc::new(definition), condition).unwrap()
    }

    #[test]
    fn first_matching_strategem_wins() {
        let roster = vec![
            combatant(1, Alignment::Party, 100),
            combatant(2, Alignment::Enemy, 50),
        ];
        let strategems = vec![
            Strategem::new(action(
                "Finisher",
                Condition::forecast_below(Alignment::Enemy, 20, true),
            )),
            Strategem::new(action("Attack", Condition::any(Alignment::Enemy))),
        ];
        let mut rng = StdRng::seed_from_u64(1);

        let intent = select_intent(&strategems, &roster, &mut rng, Tick(5)).unwrap();
        assert_eq!(intent.name(), "Attack");
    }

    #[test]
    fn empty_target_set_skips_strategem() {
        let roster = vec![combatant(1, Alignment::Party, 100)];
        let strategems = vec![Strategem::new(action("Attack", Condition::any(Alignment::Enemy)))];
        let mut rng = StdRng::seed_from_u64(1);

        assert!(select_intent(&strategems, &roster, &mut rng, Tick(5)).is_none());
    }

    #[test]
    fn gating_condition_must_match() {
        let roster = vec![
            combatant(1, Alignment::Party, 100),
            combatant(2, Alignment::Enemy, 50),
        ];
        let gated = Strategem::new(action("Rescue", Condition::any(Alignment::Enemy)))
            .with_condition(Condition::forecast_below(Alignment::Party, 30, true));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!gated.check_activation(&roster, &mut rng, Tick(5)));
    }
}
