//! Condition evaluation against a roster.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{Comparator, Condition, HealthStat, Threshold};
use crate::error::TargetingError;
use crate::state::{Combatant, CombatantId};

/// Evaluates `condition` against `roster` and returns matching combatant ids.
///
/// Only alive combatants that are not forecast-dead are considered.
///
/// - `Any`: the whole pool, freshly shuffled on every call.
/// - `ResourceThreshold`: numeric thresholds filter by the comparator; the
///   relative thresholds (`Lowest`/`Highest`) keep the whole pool. The result
///   is always ranked, ascending if the comparator is `<` or the threshold is
///   `Lowest`, descending otherwise. Callers take the first `target_ct`.
/// - `UnitQuantity`/`UnitPositional`: [`TargetingError::NotImplemented`].
pub fn get_targets<'a, I, R>(
    condition: &Condition,
    roster: I,
    rng: &mut R,
) -> Result<Vec<CombatantId>, TargetingError>
where
    I: IntoIterator<Item = &'a Combatant>,
    R: Rng + ?Sized,
{
    let unit_pool = condition.unit_pool();
    let pool = roster
        .into_iter()
        .filter(|c| c.alignment() == unit_pool && c.is_targetable());

    match condition {
        Condition::Any { .. } => {
            let mut ids: Vec<CombatantId> = pool.map(Combatant::id).collect();
            ids.shuffle(rng);
            Ok(ids)
        }

        Condition::ResourceThreshold {
            stat,
            comparator,
            threshold,
            is_percent,
            ..
        } => {
            let mut scored: Vec<(CombatantId, u32)> = pool
                .map(|c| (c.id(), health_value(c, *stat, *is_percent)))
                .filter(|(_, value)| match threshold {
                    Threshold::Value(limit) => comparator.holds(*value, *limit),
                    Threshold::Lowest | Threshold::Highest => true,
                })
                .collect();

            let ascending =
                *comparator == Comparator::LessThan || *threshold == Threshold::Lowest;
            if ascending {
                scored.sort_by_key(|(_, value)| *value);
            } else {
                scored.sort_by_key(|(_, value)| std::cmp::Reverse(*value));
            }

            Ok(scored.into_iter().map(|(id, _)| id).collect())
        }

        Condition::UnitQuantity { .. } | Condition::UnitPositional { .. } => {
            Err(TargetingError::NotImplemented {
                kind: condition.kind(),
            })
        }
    }
}

fn health_value(combatant: &Combatant, stat: HealthStat, is_percent: bool) -> u32 {
    let health = combatant.health();
    match stat {
        HealthStat::Max => health.max(),
        HealthStat::Forecasted if is_percent => health.forecast_percent(),
        HealthStat::Forecasted => health.forecast(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Alignment;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit(id: u32, alignment: Alignment, current: u32, max: u32) -> Combatant {
        Combatant::new(CombatantId(id), format!("u{id}"), alignment, max, 10.0)
            .unwrap()
            .with_current_health(current)
    }

    fn party_at_10_50_90() -> Vec<Combatant> {
        vec![
            unit(1, Alignment::Party, 90, 100),
            unit(2, Alignment::Party, 10, 100),
            unit(3, Alignment::Party, 50, 100),
            unit(4, Alignment::Enemy, 5, 100),
        ]
    }

    #[test]
    fn percent_threshold_filters_and_sorts_ascending() {
        let roster = party_at_10_50_90();
        let condition = Condition::forecast_below(Alignment::Party, 60, true);
        let mut rng = StdRng::seed_from_u64(1);

        let targets = get_targets(&condition, &roster, &mut rng).unwrap();
        assert_eq!(targets, vec![CombatantId(2), CombatantId(3)]);
    }

    #[test]
    fn relative_threshold_ranks_whole_pool() {
        let roster = party_at_10_50_90();
        let mut rng = StdRng::seed_from_u64(1);

        let lowest = get_targets(&Condition::lowest_health(Alignment::Party), &roster, &mut rng)
            .unwrap();
        assert_eq!(lowest, vec![CombatantId(2), CombatantId(3), CombatantId(1)]);

        let highest = Condition::ResourceThreshold {
            unit_pool: Alignment::Party,
            stat: HealthStat::Forecasted,
            comparator: Comparator::GreaterThan,
            threshold: Threshold::Highest,
            is_percent: false,
        };
        let ranked = get_targets(&highest, &roster, &mut rng).unwrap();
        assert_eq!(ranked, vec![CombatantId(1), CombatantId(3), CombatantId(2)]);
    }

    #[test]
    fn greater_than_sorts_descending() {
        let roster = party_at_10_50_90();
        let condition = Condition::ResourceThreshold {
            unit_pool: Alignment::Party,
            stat: HealthStat::Forecasted,
            comparator: Comparator::GreaterThan,
            threshold: Threshold::Value(20),
            is_percent: false,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let targets = get_targets(&condition, &roster, &mut rng).unwrap();
        assert_eq!(targets, vec![CombatantId(1), CombatantId(3)]);
    }

    #[test]
    fn max_health_is_compared_verbatim() {
        let roster = vec![
            unit(1, Alignment::Enemy, 10, 300),
            unit(2, Alignment::Enemy, 10, 80),
        ];
        let condition = Condition::ResourceThreshold {
            unit_pool: Alignment::Enemy,
            stat: HealthStat::Max,
            comparator: Comparator::GreaterThan,
            threshold: Threshold::Value(100),
            is_percent: true,
        };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            get_targets(&condition, &roster, &mut rng).unwrap(),
            vec![CombatantId(1)]
        );
    }

    #[test]
    fn any_excludes_dead_and_forecast_dead() {
        let mut roster = party_at_10_50_90();
        roster.push(unit(5, Alignment::Party, 0, 100));
        if let Some(doomed) = roster.iter_mut().find(|c| c.id() == CombatantId(2)) {
            doomed.forecast_damage(10);
        }
        let mut rng = StdRng::seed_from_u64(3);

        let mut targets = get_targets(&Condition::any(Alignment::Party), &roster, &mut rng).unwrap();
        targets.sort();
        assert_eq!(targets, vec![CombatantId(1), CombatantId(3)]);
    }

    #[test]
    fn any_order_varies_between_calls() {
        let roster: Vec<Combatant> = (0..8).map(|i| unit(i, Alignment::Enemy, 50, 50)).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let condition = Condition::any(Alignment::Enemy);

        let orders: Vec<Vec<CombatantId>> = (0..8)
            .map(|_| get_targets(&condition, &roster, &mut rng).unwrap())
            .collect();
        assert!(orders.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn quantity_and_positional_are_not_implemented() {
        let roster = party_at_10_50_90();
        let mut rng = StdRng::seed_from_u64(1);
        let quantity = Condition::UnitQuantity {
            unit_pool: Alignment::Party,
            comparator: Comparator::GreaterThan,
            quantity: 2,
        };
        assert_eq!(
            get_targets(&quantity, &roster, &mut rng),
            Err(TargetingError::NotImplemented {
                kind: "unitQuantity"
            })
        );
    }
}
