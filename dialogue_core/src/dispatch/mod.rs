//! Event dispatch registry - typed publish/subscribe for choice outcomes.
//!
//! Subscribers are kept in one list per (event kind, payload type). A
//! publish only reaches the list whose payload type is exactly the
//! published value's type; subscribers for other types are skipped, and a
//! publish nobody listens to is not an error.
//!
//! Publishing snapshots the subscriber list and releases the lock before
//! invoking anything, so handlers may subscribe or unsubscribe (including
//! themselves) while being called. Changes take effect from the next publish.

mod event;
mod handler;

pub use event::*;
pub use handler::Handler;

use handler::ErasedHandler;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

use crate::graph::{Choice, ChoiceObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriptionKey {
    kind: DialogueEventKind,
    payload: TypeId,
}

impl SubscriptionKey {
    fn of<T: 'static>(kind: DialogueEventKind) -> Self {
        Self {
            kind,
            payload: TypeId::of::<T>(),
        }
    }
}

/// Type-indexed subscriber registry shared by the host and its sessions.
#[derive(Default)]
pub struct EventRegistry {
    subscribers: RwLock<HashMap<SubscriptionKey, Vec<ErasedHandler>>>,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `kind` for payloads of type `T`.
    ///
    /// Returns false if this handler was already subscribed for this kind
    /// and payload type; it is never added twice.
    pub fn subscribe<T: 'static>(&self, kind: DialogueEventKind, handler: &Handler<T>) -> bool {
        let mut subscribers = self.subscribers.write();
        let list = subscribers
            .entry(SubscriptionKey::of::<T>(kind))
            .or_default();

        if list.iter().any(|s| s.id == handler.id()) {
            return false;
        }

        tracing::debug!(
            event = %kind,
            payload = std::any::type_name::<T>(),
            "subscribed dialogue handler"
        );
        list.push(ErasedHandler::new(handler));
        true
    }

    /// Wrap `callback` in a new handler, subscribe it, and return the
    /// handler for later unsubscription.
    pub fn on<T: 'static>(
        &self,
        kind: DialogueEventKind,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Handler<T> {
        let handler = Handler::new(callback);
        self.subscribe(kind, &handler);
        handler
    }

    /// Remove `handler` from `kind`. Returns false if it was not subscribed.
    pub fn unsubscribe<T: 'static>(&self, kind: DialogueEventKind, handler: &Handler<T>) -> bool {
        let key = SubscriptionKey::of::<T>(kind);
        let mut subscribers = self.subscribers.write();

        let Some(list) = subscribers.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| s.id != handler.id());
        let removed = list.len() != before;

        if list.is_empty() {
            subscribers.remove(&key);
        }
        removed
    }

    /// Deliver `payload` to every `T` subscriber of `kind`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish<T: 'static>(&self, kind: DialogueEventKind, payload: &T) -> usize {
        let snapshot = self
            .subscribers
            .read()
            .get(&SubscriptionKey::of::<T>(kind))
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            tracing::trace!(
                event = %kind,
                payload = std::any::type_name::<T>(),
                "no subscribers for dialogue event"
            );
            return 0;
        }

        let mut delivered = 0;
        for subscriber in &snapshot {
            if let Some(handler) = subscriber.downcast::<T>() {
                handler.call(payload);
                delivered += 1;
            }
        }

        tracing::debug!(event = %kind, delivered, "published dialogue event");
        delivered
    }

    /// Publish the payload a choice carries.
    ///
    /// An object payload is delivered as its concrete type. Otherwise the
    /// string parameter is delivered as a `String` (empty when unset).
    pub fn publish_choice(&self, choice: &Choice) -> usize {
        match &choice.object {
            Some(ChoiceObject::Item(item)) => self.publish(choice.event_kind, item),
            Some(ChoiceObject::ItemData(data)) => self.publish(choice.event_kind, data),
            None => {
                let parameter = choice.parameter.clone().unwrap_or_default();
                self.publish(choice.event_kind, &parameter)
            }
        }
    }

    /// Number of `T` subscribers for `kind`.
    pub fn subscriber_count<T: 'static>(&self, kind: DialogueEventKind) -> usize {
        self.subscribers
            .read()
            .get(&SubscriptionKey::of::<T>(kind))
            .map_or(0, Vec::len)
    }

    /// Whether `handler` is subscribed to `kind`.
    pub fn is_subscribed<T: 'static>(&self, kind: DialogueEventKind, handler: &Handler<T>) -> bool {
        self.subscribers
            .read()
            .get(&SubscriptionKey::of::<T>(kind))
            .is_some_and(|list| list.iter().any(|s| s.id == handler.id()))
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.read();
        let total: usize = subscribers.values().map(Vec::len).sum();
        f.debug_struct("EventRegistry")
            .field("lists", &subscribers.len())
            .field("subscribers", &total)
            .finish()
    }
}
