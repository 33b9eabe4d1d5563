//! Hurt/heal interaction locks.
//!
//! Locks are keyed by the combatant that acquired them, so several attackers
//! can hold a hurt lock on the same target at once. The target stays locked
//! until the last key is released.

use std::collections::BTreeSet;

use super::CombatantId;

/// Which episode a lock protects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LockKind {
    Hurt,
    Heal,
}

/// Per-target lock sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionLocks {
    hurt: BTreeSet<CombatantId>,
    heal: BTreeSet<CombatantId>,
}

impl InteractionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self, kind: LockKind) -> &BTreeSet<CombatantId> {
        match kind {
            LockKind::Hurt => &self.hurt,
            LockKind::Heal => &self.heal,
        }
    }

    fn keys_mut(&mut self, kind: LockKind) -> &mut BTreeSet<CombatantId> {
        match kind {
            LockKind::Hurt => &mut self.hurt,
            LockKind::Heal => &mut self.heal,
        }
    }

    /// Adds `locker`'s key. Returns false if that key was already held.
    pub fn acquire(&mut self, kind: LockKind, locker: CombatantId) -> bool {
        self.keys_mut(kind).insert(locker)
    }

    /// Removes `locker`'s key. Returns false if that key was not held.
    pub fn release(&mut self, kind: LockKind, locker: CombatantId) -> bool {
        self.keys_mut(kind).remove(&locker)
    }

    pub fn is_locked(&self, kind: LockKind) -> bool {
        !self.keys(kind).is_empty()
    }

    pub fn is_hurt_locked(&self) -> bool {
        self.is_locked(LockKind::Hurt)
    }

    pub fn is_heal_locked(&self) -> bool {
        self.is_locked(LockKind::Heal)
    }

    /// True while any hurt or heal key is outstanding.
    pub fn any(&self) -> bool {
        self.is_hurt_locked() || self.is_heal_locked()
    }

    /// Number of outstanding keys of the given kind.
    pub fn holders(&self, kind: LockKind) -> usize {
        self.keys(kind).len()
    }

    /// Drops every key, e.g. when the combatant is removed from the roster.
    pub fn clear(&mut self) {
        self.hurt.clear();
        self.heal.clear();
    }
}
