//! Readiness-ordered action queue.
//!
//! Entries are kept sorted by descending activation time so the entry with the
//! smallest activation time sits at the tail and is popped first. Among equal
//! activation times the entry queued first is popped first, and an entry that
//! fails re-validation is pushed back to exactly the slot it was popped from,
//! so retries never reorder it against its neighbours.

use crate::state::CombatantId;

/// A combatant waiting for its turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueueEntry {
    pub combatant: CombatantId,
    pub activation_time: f64,
}

impl QueueEntry {
    pub const fn new(combatant: CombatantId, activation_time: f64) -> Self {
        Self {
            combatant,
            activation_time,
        }
    }
}

/// Priority queue of ready combatants.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    // Descending by activation time; the tail is next.
    entries: Vec<QueueEntry>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a combatant at its sorted position.
    ///
    /// The queue holds a combatant at most once; callers are expected to
    /// check [`is_action_queued`](Self::is_action_queued) first. A duplicate
    /// insertion leaves the queue unchanged and returns false.
    pub fn queue_action(&mut self, combatant: CombatantId, activation_time: f64) -> bool {
        if self.is_action_queued(combatant) {
            return false;
        }
        // Before any existing entry with the same time, so earlier insertions
        // stay closer to the tail.
        let index = self
            .entries
            .partition_point(|e| e.activation_time.total_cmp(&activation_time).is_gt());
        self.entries
            .insert(index, QueueEntry::new(combatant, activation_time));
        true
    }

    pub fn is_action_queued(&self, combatant: CombatantId) -> bool {
        self.entries.iter().any(|e| e.combatant == combatant)
    }

    /// Removes and returns the entry with the smallest activation time.
    pub fn pop_next(&mut self) -> Option<QueueEntry> {
        self.entries.pop()
    }

    /// Returns a popped entry to its previous slot.
    ///
    /// The entry goes after every entry with the same activation time (i.e.
    /// nearest the tail), which is where it was popped from.
    pub fn push_back(&mut self, entry: QueueEntry) {
        let index = self
            .entries
            .partition_point(|e| e.activation_time.total_cmp(&entry.activation_time).is_ge());
        self.entries.insert(index, entry);
    }

    /// The entry that would be popped next.
    pub fn peek_next(&self) -> Option<&QueueEntry> {
        self.entries.last()
    }

    /// Removes a combatant's entry, if any.
    pub fn remove(&mut self, combatant: CombatantId) -> Option<QueueEntry> {
        let index = self.entries.iter().position(|e| e.combatant == combatant)?;
        Some(self.entries.remove(index))
    }

    pub fn clear_queue(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in dequeue order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> + '_ {
        self.entries.iter().rev()
    }
}
