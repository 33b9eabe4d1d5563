use battle_core::{Alignment, Combatant};

/// Result of a battle as seen from the party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    Ongoing,
    /// Every enemy is dead.
    Victory,
    /// Every party member is dead. Takes precedence over a simultaneous wipe.
    Defeat,
}

impl BattleOutcome {
    pub fn evaluate<'a>(roster: impl IntoIterator<Item = &'a Combatant>) -> Self {
        let (mut party, mut enemies) = (0usize, 0usize);
        for combatant in roster.into_iter().filter(|c| c.is_alive()) {
            match combatant.alignment() {
                Alignment::Party => party += 1,
                Alignment::Enemy => enemies += 1,
            }
        }
        match (party, enemies) {
            (0, _) => Self::Defeat,
            (_, 0) => Self::Victory,
            _ => Self::Ongoing,
        }
    }

    pub fn is_over(self) -> bool {
        self != Self::Ongoing
    }
}
