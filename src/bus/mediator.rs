//! Core mediator trait for the topic layer.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A handler attached to a topic on the mediator.
///
/// Handlers are shared (`Arc`) so a mediator can snapshot its subscriber list
/// and invoke them without holding its own lock.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Opaque handle returned by [`Mediator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw identifier. Mediator implementations own the numbering.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Trait for a publish/subscribe bus keyed by topic strings.
///
/// Implementations might include:
/// - `InMemoryMediator` - synchronous, single-process dispatch
/// - adapters over a host application's existing event bus
///
/// `publish` must tolerate handlers that publish, subscribe or unsubscribe
/// while they are being invoked.
pub trait Mediator: Send + Sync {
    /// Deliver `payload` to every handler subscribed to `topic`.
    ///
    /// Returns the number of handlers invoked.
    fn publish(&self, topic: &str, payload: Value) -> usize;

    /// Attach `handler` to `topic`.
    fn subscribe(&self, topic: &str, handler: Handler) -> SubscriptionId;

    /// Detach a handler. Returns `false` if the id was unknown or already
    /// released.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

impl<M: Mediator + ?Sized> Mediator for Arc<M> {
    fn publish(&self, topic: &str, payload: Value) -> usize {
        (**self).publish(topic, payload)
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> SubscriptionId {
        (**self).subscribe(topic, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }
}
