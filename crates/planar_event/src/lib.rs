//! # planar_event - Deferred Event Delivery
//!
//! Events raised while a character is mid-tick are queued and handed to
//! subscribers in one batch when the owner calls [`EventBus::process`].
//! Subscribers therefore only ever observe a finished tick.
//!
//! Delivery order: events by descending [`Priority`], publication order
//! within a priority; for each event, subscribers by descending priority,
//! registration order within a priority.

use std::collections::VecDeque;

/// Ordering class for events and subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

struct Subscriber<E> {
    id: SubscriberId,
    priority: Priority,
    handler: Handler<E>,
}

/// Queue plus subscriber list for one event type
pub struct EventBus<E> {
    queued: VecDeque<(Priority, E)>,
    subscribers: Vec<Subscriber<E>>,
    next_id: u64,
    batches: u64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            subscribers: Vec::new(),
            next_id: 1,
            batches: 0,
        }
    }

    /// Queue an event at [`Priority::Normal`]
    pub fn publish(&mut self, event: E) {
        self.publish_with_priority(event, Priority::Normal);
    }

    pub fn publish_with_priority(&mut self, event: E, priority: Priority) {
        self.queued.push_back((priority, event));
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe_with_priority(handler, Priority::Normal)
    }

    pub fn subscribe_with_priority<F>(&mut self, handler: F, priority: Priority) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;

        // ids grow monotonically, so inserting after every subscriber of
        // equal or higher priority keeps registration order
        let at = self
            .subscribers
            .iter()
            .position(|s| s.priority < priority)
            .unwrap_or(self.subscribers.len());
        self.subscribers.insert(at, Subscriber { id, priority, handler: Box::new(handler) });
        id
    }

    /// Returns whether the subscriber existed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        match self.subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                self.subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver everything queued and return it in delivery order
    pub fn process(&mut self) -> Vec<E> {
        let mut batch: Vec<(Priority, E)> = self.queued.drain(..).collect();
        batch.sort_by(|a, b| b.0.cmp(&a.0));
        self.batches += 1;

        if batch.is_empty() {
            return Vec::new();
        }
        log::trace!(
            "batch {}: {} events, {} subscribers",
            self.batches,
            batch.len(),
            self.subscribers.len()
        );

        batch
            .into_iter()
            .map(|(_, event)| {
                for subscriber in &self.subscribers {
                    (subscriber.handler)(&event);
                }
                event
            })
            .collect()
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) {
        self.queued.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.queued.len()
    }

    /// Number of [`process`](Self::process) calls so far
    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

pub mod prelude {
    pub use crate::{EventBus, Priority, SubscriberId};
}
