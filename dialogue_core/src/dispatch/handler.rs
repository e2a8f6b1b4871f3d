//! Typed event handlers with pointer identity.

use std::any::Any;
use std::sync::Arc;

/// A shared callback accepting payloads of type `T`.
///
/// Clones of a handler are the *same* handler: subscribing a clone twice is
/// a no-op, and unsubscribing any clone removes it.
pub struct Handler<T> {
    callback: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> Handler<T> {
    pub fn new(callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback directly.
    pub fn call(&self, payload: &T) {
        (self.callback)(payload)
    }

    pub(crate) fn id(&self) -> HandlerId {
        HandlerId(Arc::as_ptr(&self.callback) as *const () as usize)
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> std::fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id())
            .field("payload", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> PartialEq for Handler<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T> Eq for Handler<T> {}

/// Identity of a handler's shared callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandlerId(usize);

/// A type-erased subscription entry.
#[derive(Clone)]
pub(crate) struct ErasedHandler {
    pub(crate) id: HandlerId,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedHandler {
    pub(crate) fn new<T: 'static>(handler: &Handler<T>) -> Self {
        Self {
            id: handler.id(),
            inner: Arc::new(handler.clone()),
        }
    }

    /// Recover the typed handler. `None` if `T` is not the subscribed type.
    pub(crate) fn downcast<T: 'static>(&self) -> Option<&Handler<T>> {
        self.inner.downcast_ref::<Handler<T>>()
    }
}
