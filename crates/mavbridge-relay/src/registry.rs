use tracing::debug;

use crate::subscriber::{Subscriber, SubscriberId};

/// The live subscriber set.
///
/// Owned by the connection layer, which adds on connect and removes on
/// disconnect. Broadcasting borrows it through [`SubscriberRegistry::snapshot`]
/// and never changes membership.
pub struct SubscriberRegistry {
    subscribers: Vec<Box<dyn Subscriber + Send>>,
    next_id: u64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve an id for a subscriber about to be added.
    pub fn allocate_id(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, subscriber: Box<dyn Subscriber + Send>) -> SubscriberId {
        let id = subscriber.id();
        debug!(%id, "subscriber registered");
        self.subscribers.push(subscriber);
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.id() != id);
        let removed = self.subscribers.len() != before;
        if removed {
            debug!(%id, "subscriber unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = SubscriberId> + '_ {
        self.subscribers.iter().map(|sub| sub.id())
    }

    /// Every registered subscriber, ready or not, in registration order.
    pub fn snapshot(&mut self) -> std::slice::IterMut<'_, Box<dyn Subscriber + Send>> {
        self.subscribers.iter_mut()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
