//! Minimal reactive value cell.
//!
//! [`Observable`] stores a value and notifies subscribers when it is set.
//! Subscribers registered with [`Observable::once`] are dropped after their
//! first notification.
//!
//! `set`/`emit` call subscribers immediately. `set_deferred`/`emit_deferred`
//! update the value but hand back a [`Notification`] instead, so an owner that
//! sits behind a lock can deliver it once the lock is released. Callbacks must
//! not re-enter the cell they observe while it is notifying.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by `subscribe`/`once`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<Mutex<dyn FnMut(&T) + Send>>;

struct Subscriber<T> {
    id: SubscriptionId,
    once: bool,
    callback: Callback<T>,
}

/// A value together with the callbacks that still have to see it.
pub struct Notification<T> {
    value: T,
    callbacks: Vec<Callback<T>>,
}

impl<T> Notification<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Calls every captured subscriber with the value.
    pub fn deliver(self) {
        for callback in self.callbacks {
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            (callback)(&self.value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Notification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("value", &self.value)
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

/// Value cell with subscribe/unsubscribe/once semantics.
pub struct Observable<T> {
    value: T,
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Registers a callback invoked on every notification.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        self.register(false, Arc::new(Mutex::new(callback)))
    }

    /// Registers a callback invoked on the next notification only.
    pub fn once(&mut self, callback: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        self.register(true, Arc::new(Mutex::new(callback)))
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Drops every subscription.
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn register(&mut self, once: bool, callback: Callback<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, once, callback });
        id
    }
}

impl<T: Clone> Observable<T> {
    /// Stores `value` and notifies subscribers unconditionally.
    pub fn emit(&mut self, value: T) {
        if let Some(notification) = self.emit_deferred(value) {
            notification.deliver();
        }
    }

    /// Stores `value` and returns the notification owed to the current
    /// subscribers, or `None` if nobody is listening. `once` subscribers are
    /// removed here, not on delivery.
    pub fn emit_deferred(&mut self, value: T) -> Option<Notification<T>> {
        self.value = value;
        if self.subscribers.is_empty() {
            return None;
        }
        let callbacks = self
            .subscribers
            .iter()
            .map(|s| Arc::clone(&s.callback))
            .collect();
        self.subscribers.retain(|s| !s.once);
        Some(Notification {
            value: self.value.clone(),
            callbacks,
        })
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Stores `value`, notifying subscribers only if it changed.
    pub fn set(&mut self, value: T) {
        if let Some(notification) = self.set_deferred(value) {
            notification.deliver();
        }
    }

    /// Like [`set`](Self::set), returning the notification instead of
    /// delivering it.
    pub fn set_deferred(&mut self, value: T) -> Option<Notification<T>> {
        if self.value == value {
            return None;
        }
        self.emit_deferred(value)
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
