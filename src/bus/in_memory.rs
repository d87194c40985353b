//! In-memory mediator for testing and single-process scenarios.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use super::{Handler, Mediator, SubscriptionId};

#[derive(Default)]
struct Registry {
    /// Handlers per topic, in subscription order.
    by_topic: HashMap<String, Vec<(SubscriptionId, Handler)>>,
    /// Reverse index so `unsubscribe` only needs the id.
    topic_of: HashMap<SubscriptionId, String>,
}

/// In-memory mediator with synchronous delivery.
///
/// Features:
/// - Thread-safe, shared across namespaces via `Clone` (clones share state)
/// - Exact-match topics, handlers invoked in subscription order
/// - Every subscriber has seen the payload by the time `publish` returns
/// - Re-entrant: handlers may publish, subscribe or unsubscribe
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use mediator_topics::bus::{InMemoryMediator, Mediator};
/// use serde_json::{json, Value};
///
/// let mediator = InMemoryMediator::new();
/// let id = mediator.subscribe("wfm:user:create", Arc::new(|payload: &Value| {
///     assert_eq!(payload["id"], "trever");
/// }));
///
/// assert_eq!(mediator.publish("wfm:user:create", json!({ "id": "trever" })), 1);
/// assert!(mediator.unsubscribe(id));
/// assert_eq!(mediator.publish("wfm:user:create", json!({})), 0);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryMediator {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryMediator {
    /// Create a new, empty mediator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers currently attached to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry
            .read()
            .by_topic
            .get(topic)
            .map_or(0, |handlers| handlers.len())
    }

    /// All topics with at least one handler, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.registry.read().by_topic.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.registry.read().topic_of.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.registry.read().topic_of.is_empty()
    }
}

impl Mediator for InMemoryMediator {
    fn publish(&self, topic: &str, payload: Value) -> usize {
        // Snapshot, then release the lock before running handlers.
        let handlers: Vec<Handler> = match self.registry.read().by_topic.get(topic) {
            Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => Vec::new(),
        };

        trace!(target: "mediator.bus", topic, handlers = handlers.len(), "publish");

        for handler in &handlers {
            handler(&payload);
        }
        handlers.len()
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut registry = self.registry.write();
        registry
            .by_topic
            .entry(topic.to_string())
            .or_default()
            .push((id, handler));
        registry.topic_of.insert(id, topic.to_string());
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write();
        let Some(topic) = registry.topic_of.remove(&id) else {
            return false;
        };
        if let Some(handlers) = registry.by_topic.get_mut(&topic) {
            handlers.retain(|(sub, _)| *sub != id);
            if handlers.is_empty() {
                registry.by_topic.remove(&topic);
            }
        }
        true
    }
}
