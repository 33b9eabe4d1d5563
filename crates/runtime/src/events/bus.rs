//! Topic-based event bus implementation.

use std::collections::HashMap;

use tokio::sync::broadcast;

use super::types::{ActionEvent, CombatantEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, strum::Display, strum::EnumIter)]
pub enum Topic {
    /// Readiness, dequeues, prompts, clock halts
    Turn,
    /// Charge, hurt/heal pulses, deaths
    Combatant,
    /// Action phases and completion
    Action,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Turn(TurnEvent),
    Combatant(CombatantEvent),
    Action(ActionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(_) => Topic::Turn,
            Event::Combatant(_) => Topic::Combatant,
            Event::Action(_) => Topic::Action,
        }
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<CombatantEvent> for Event {
    fn from(event: CombatantEvent) -> Self {
        Event::Combatant(event)
    }
}

impl From<ActionEvent> for Event {
    fn from(event: ActionEvent) -> Self {
        Event::Action(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while a topic
/// has no subscribers are dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    turn: broadcast::Sender<Event>,
    combatant: broadcast::Sender<Event>,
    action: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 128;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turn: broadcast::channel(capacity).0,
            combatant: broadcast::channel(capacity).0,
            action: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Combatant => &self.combatant,
            Topic::Action => &self.action,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "battle::events", %topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
