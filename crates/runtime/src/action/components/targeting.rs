use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;

use battle_core::{Combatant, CombatantId, Condition, TargetingError, get_targets};

use crate::action::{ActionComponent, ActionInstance, ComponentKind};
use crate::api::Result;
use crate::session::BattleState;

/// Resolves who an action hits.
///
/// Between `prepare` and `cleanup` the resolved list is frozen, so every other
/// component of the execution sees the same targets even if health or
/// positions change mid-animation.
#[derive(Debug)]
pub struct TargetStrategy {
    condition: Condition,
    target_ct: usize,
    snapshot: Mutex<Option<Vec<CombatantId>>>,
}

impl TargetStrategy {
    pub fn new(condition: Condition, target_ct: usize) -> Self {
        Self {
            condition,
            target_ct: target_ct.max(1),
            snapshot: Mutex::new(None),
        }
    }

    fn snapshot(&self) -> MutexGuard<'_, Option<Vec<CombatantId>>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn target_ct(&self) -> usize {
        self.target_ct
    }

    /// The first `target_ct` ranked matches, or the frozen list while locked.
    pub fn resolve<'a, I, R>(&self, roster: I, rng: &mut R) -> Result<Vec<CombatantId>>
    where
        I: IntoIterator<Item = &'a Combatant>,
        R: Rng + ?Sized,
    {
        if let Some(frozen) = self.snapshot().as_ref() {
            return Ok(frozen.clone());
        }
        self.resolve_fresh(roster, rng).map_err(Into::into)
    }

    fn resolve_fresh<'a, I, R>(
        &self,
        roster: I,
        rng: &mut R,
    ) -> std::result::Result<Vec<CombatantId>, TargetingError>
    where
        I: IntoIterator<Item = &'a Combatant>,
        R: Rng + ?Sized,
    {
        let mut targets = get_targets(&self.condition, roster, rng)?;
        targets.truncate(self.target_ct);
        Ok(targets)
    }

    /// Freezes `targets` for the coming execution.
    pub fn lock_targets(&self, targets: Vec<CombatantId>) {
        *self.snapshot() = Some(targets);
    }

    pub fn unlock_targets(&self) {
        *self.snapshot() = None;
    }

    pub fn is_locked(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Frozen targets, empty when not locked.
    pub fn locked_targets(&self) -> Vec<CombatantId> {
        self.snapshot().clone().unwrap_or_default()
    }
}

impl ActionComponent for TargetStrategy {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Targeting
    }

    fn prepare(&self, _action: &ActionInstance, state: &mut BattleState) -> Result<()> {
        // The scheduler may already have frozen the list it validated.
        if self.is_locked() {
            return Ok(());
        }
        let BattleState { roster, rng, .. } = state;
        let targets = self.resolve_fresh(roster.values(), rng)?;
        self.lock_targets(targets);
        Ok(())
    }

    fn cleanup(&self, _action: &ActionInstance, _state: &mut BattleState) {
        self.unlock_targets();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::Alignment;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roster() -> Vec<Combatant> {
        [(1, 40), (2, 10), (3, 25)]
            .into_iter()
            .map(|(id, hp)| {
                Combatant::new(CombatantId(id), format!("slime{id}"), Alignment::Enemy, 40, 10.0)
                    .unwrap()
                    .with_current_health(hp)
            })
            .collect()
    }

    #[test]
    fn truncates_ranked_targets_to_target_ct() {
        let strategy = TargetStrategy::new(Condition::lowest_health(Alignment::Enemy), 2);
        let mut rng = StdRng::seed_from_u64(7);
        let targets = strategy.resolve(&roster(), &mut rng).unwrap();
        assert_eq!(targets, vec![CombatantId(2), CombatantId(3)]);
    }

    #[test]
    fn locked_list_survives_roster_changes() {
        let strategy = TargetStrategy::new(Condition::lowest_health(Alignment::Enemy), 1);
        let mut rng = StdRng::seed_from_u64(7);
        strategy.lock_targets(vec![CombatantId(1)]);

        assert_eq!(
            strategy.resolve(&roster(), &mut rng).unwrap(),
            vec![CombatantId(1)]
        );
        strategy.unlock_targets();
        assert_eq!(
            strategy.resolve(&roster(), &mut rng).unwrap(),
            vec![CombatantId(2)]
        );
    }

    #[test]
    fn unimplemented_conditions_surface_as_errors() {
        let strategy = TargetStrategy::new(
            Condition::UnitQuantity {
                unit_pool: Alignment::Enemy,
                comparator: battle_core::Comparator::GreaterThan,
                quantity: 2,
            },
            1,
        );
        let mut rng = StdRng::seed_from_u64(7);
        assert!(strategy.resolve(&roster(), &mut rng).is_err());
    }
}
