//! Typed publish/subscribe for game events.
//!
//! Listeners register for one [`EventKind`] or for every event. Events are
//! delivered synchronously, in publish order, after the change they describe
//! has been fully applied to the ledger.

use std::collections::BTreeMap;

use farpost_types::{EventKind, GameEvent};

/// Receives published game events.
pub trait EventListener: Send {
    /// Called once per matching event.
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&GameEvent) + Send,
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event);
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    filter: Option<EventKind>,
    listener: Box<dyn EventListener>,
}

/// Registry of listeners for one session.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of `filter`, or for all events when
    /// `filter` is `None`.
    pub fn subscribe(
        &mut self,
        filter: Option<EventKind>,
        listener: Box<dyn EventListener>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscriptions
            .insert(id, Subscription { filter, listener });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver `event` to every matching listener in subscription order.
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for subscription in self.subscriptions.values_mut() {
            if subscription.filter.is_none_or(|filter| filter == kind) {
                subscription.listener.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<EventKind>>>, Box<dyn EventListener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = Box::new(move |event: &GameEvent| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(event.kind());
            }
        });
        (seen, listener)
    }

    fn seen(log: &Arc<Mutex<Vec<EventKind>>>) -> Vec<EventKind> {
        log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[test]
    fn filtered_listener_sees_only_its_kind() {
        let mut bus = EventBus::new();
        let (all, listener) = recorder();
        bus.subscribe(None, listener);
        let (resets, listener) = recorder();
        bus.subscribe(Some(EventKind::StateReset), listener);

        bus.publish(&GameEvent::StateChanged);
        bus.publish(&GameEvent::StateReset);

        assert_eq!(seen(&all), vec![EventKind::StateChanged, EventKind::StateReset]);
        assert_eq!(seen(&resets), vec![EventKind::StateReset]);
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let mut bus = EventBus::new();
        let (log, listener) = recorder();
        let id = bus.subscribe(None, listener);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&GameEvent::StateChanged);
        assert!(seen(&log).is_empty());
        assert!(bus.is_empty());
    }
}
