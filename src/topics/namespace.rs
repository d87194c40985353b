//! Topics - a namespace of topic names over a shared mediator.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::config::TopicsConfig;
use super::outcome::{self, Reply};
use super::topic;
use crate::bus::{Handler, Mediator, SubscriptionId};
use crate::error::TopicError;

/// A subscription made through one namespace.
#[derive(Debug, Clone)]
struct Subscription {
    topic: String,
    id: SubscriptionId,
}

struct Namespace {
    mediator: Arc<dyn Mediator>,
    config: Arc<TopicsConfig>,
    prefix: Vec<String>,
    entity: Option<String>,
    registry: Mutex<Vec<Subscription>>,
}

impl Namespace {
    fn release(mediator: &dyn Mediator, records: Vec<Subscription>) -> usize {
        let mut released = 0;
        for record in records {
            if mediator.unsubscribe(record.id) {
                released += 1;
            }
            debug!(target: "mediator.topics", topic = %record.topic, id = %record.id, "unsubscribed");
        }
        released
    }
}

impl Drop for Namespace {
    fn drop(&mut self) {
        let records = std::mem::take(self.registry.get_mut());
        Namespace::release(self.mediator.as_ref(), records);
    }
}

/// A topic namespace: `prefix:...:entity` over a shared [`Mediator`].
///
/// Cloning a `Topics` yields another handle to the *same* namespace (same
/// subscription registry). `prefix` and `entity` derive *new* namespaces that
/// share the mediator and configuration but own their subscriptions
/// independently. When the last handle to a namespace is dropped, its
/// subscriptions are released.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use mediator_topics::{InMemoryMediator, Topics};
/// use serde_json::{json, Value};
///
/// let users = Topics::new(Arc::new(InMemoryMediator::new()))
///     .prefix("wfm:cloud")
///     .entity("user");
///
/// assert_eq!(users.topic("create", None), "wfm:cloud:user:create");
/// assert_eq!(users.topic("create", Some("done")), "done:wfm:cloud:user:create");
///
/// users.on("create", |_topics, user: Value| -> Result<Value, mediator_topics::TopicError> {
///     Ok(user)
/// });
/// users.on_done("create:trever", |_topics, user| {
///     assert_eq!(user["id"], "trever");
/// });
/// users.publish("create", json!({ "id": "trever" }));
/// ```
#[derive(Clone)]
pub struct Topics {
    inner: Arc<Namespace>,
}

/// A non-owning reference to a namespace.
#[derive(Clone)]
pub(crate) struct WeakTopics(Weak<Namespace>);

impl WeakTopics {
    pub(crate) fn upgrade(&self) -> Option<Topics> {
        self.0.upgrade().map(|inner| Topics { inner })
    }
}

impl Topics {
    /// Create a root namespace (no prefix, no entity) with default settings.
    pub fn new(mediator: Arc<dyn Mediator>) -> Self {
        Self::with_config(mediator, TopicsConfig::default())
    }

    /// Create a root namespace with explicit settings.
    pub fn with_config(mediator: Arc<dyn Mediator>, config: TopicsConfig) -> Self {
        Self::from_parts(mediator, Arc::new(config), Vec::new(), None)
    }

    fn from_parts(
        mediator: Arc<dyn Mediator>,
        config: Arc<TopicsConfig>,
        prefix: Vec<String>,
        entity: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Namespace {
                mediator,
                config,
                prefix,
                entity,
                registry: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derive a namespace with `segment` appended to the prefix.
    ///
    /// Prefix segments always precede the entity, whatever order `prefix`
    /// and `entity` are chained in.
    pub fn prefix(&self, segment: impl Into<String>) -> Topics {
        let mut prefix = self.inner.prefix.clone();
        prefix.push(segment.into());
        Self::from_parts(
            Arc::clone(&self.inner.mediator),
            Arc::clone(&self.inner.config),
            prefix,
            self.inner.entity.clone(),
        )
    }

    /// Derive a namespace narrowed to the entity `name`.
    pub fn entity(&self, name: impl Into<String>) -> Topics {
        Self::from_parts(
            Arc::clone(&self.inner.mediator),
            Arc::clone(&self.inner.config),
            self.inner.prefix.clone(),
            Some(name.into()),
        )
    }

    /// Compose a fully-qualified topic: `[suffix:]prefix:entity:action`.
    ///
    /// `action` must be non-empty. It may carry a correlation id
    /// (`"create:trever"`).
    pub fn topic(&self, action: &str, suffix: Option<&str>) -> String {
        topic::compose(
            &self.inner.config.separator,
            &self.inner.prefix,
            self.inner.entity.as_deref(),
            action,
            suffix,
        )
    }

    /// `topic(action, Some(done_suffix))`.
    pub fn done_topic(&self, action: &str) -> String {
        self.topic(action, Some(&self.inner.config.done_suffix))
    }

    /// `topic(action, Some(error_suffix))`.
    pub fn error_topic(&self, action: &str) -> String {
        self.topic(action, Some(&self.inner.config.error_suffix))
    }

    /// Handle `action`.
    ///
    /// The handler receives this namespace and the published payload. Its
    /// reply is republished on the `done` or `error` topic (see
    /// [`Reply`]); a `()` reply publishes nothing. A panicking handler is
    /// reported on the `error` topic instead of unwinding into the
    /// publisher.
    ///
    /// Every call adds a subscription; repeated registrations for the same
    /// action are not merged.
    pub fn on<F, R>(&self, action: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Topics, Value) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        let owned_action = action.to_string();
        self.attach(self.topic(action, None), move |topics, payload| {
            let reply = match panic::catch_unwind(AssertUnwindSafe(|| -> Reply {
                handler(topics, payload.clone()).into()
            })) {
                Ok(reply) => reply,
                Err(panic) => {
                    let error = TopicError::from_panic(panic.as_ref());
                    warn!(target: "mediator.topics", action = %owned_action, error = %error, "handler panicked");
                    Reply::Ready(Err(error))
                }
            };
            outcome::settle(topics, &owned_action, reply);
        })
    }

    /// Listen for resolved outcomes of `action` (optionally `action:id`).
    pub fn on_done<F>(&self, action: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Topics, Value) + Send + Sync + 'static,
    {
        self.attach(self.done_topic(action), move |topics, payload| {
            handler(topics, payload.clone())
        })
    }

    /// Listen for faults of `action` (optionally `action:id`).
    pub fn on_error<F>(&self, action: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Topics, TopicError) + Send + Sync + 'static,
    {
        self.attach(self.error_topic(action), move |topics, payload| {
            handler(topics, TopicError::from_payload(payload))
        })
    }

    /// Publish `payload` on `topic(action)`. Returns the number of handlers
    /// the mediator invoked.
    pub fn publish(&self, action: &str, payload: Value) -> usize {
        self.publish_to(&self.topic(action, None), payload)
    }

    pub(crate) fn publish_to(&self, topic: &str, payload: Value) -> usize {
        self.inner.mediator.publish(topic, payload)
    }

    /// Release one subscription made through this namespace.
    ///
    /// Returns `false` if `id` does not belong to this namespace or was
    /// already released; subscriptions of other namespaces are never touched.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let record = {
            let mut registry = self.inner.registry.lock();
            registry
                .iter()
                .position(|record| record.id == id)
                .map(|index| registry.remove(index))
        };
        match record {
            Some(record) => Namespace::release(self.inner.mediator.as_ref(), vec![record]) == 1,
            None => false,
        }
    }

    /// Release every subscription made through this namespace, including
    /// listeners of requests still waiting for an outcome. Safe to call
    /// repeatedly. Returns how many subscriptions were released.
    pub fn unsubscribe_all(&self) -> usize {
        let records = std::mem::take(&mut *self.inner.registry.lock());
        Namespace::release(self.inner.mediator.as_ref(), records)
    }

    /// Number of live subscriptions owned by this namespace.
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Topics this namespace is subscribed to, in registration order.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.inner
            .registry
            .lock()
            .iter()
            .map(|record| record.topic.clone())
            .collect()
    }

    /// Prefix segments in the order they were added.
    pub fn prefix_segments(&self) -> &[String] {
        &self.inner.prefix
    }

    /// The entity name, if narrowed.
    pub fn entity_name(&self) -> Option<&str> {
        self.inner.entity.as_deref()
    }

    pub fn config(&self) -> &TopicsConfig {
        &self.inner.config
    }

    pub fn mediator(&self) -> &Arc<dyn Mediator> {
        &self.inner.mediator
    }

    /// True if both handles refer to the same namespace instance.
    pub fn ptr_eq(&self, other: &Topics) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakTopics {
        WeakTopics(Arc::downgrade(&self.inner))
    }

    /// Subscribe on the mediator and record the subscription.
    ///
    /// The mediator only holds a weak reference to the namespace; once the
    /// namespace is gone a stray delivery is ignored.
    fn attach<F>(&self, topic: String, invoke: F) -> SubscriptionId
    where
        F: Fn(&Topics, &Value) + Send + Sync + 'static,
    {
        let weak = self.downgrade();
        let handler: Handler = Arc::new(move |payload: &Value| {
            if let Some(topics) = weak.upgrade() {
                invoke(&topics, payload);
            }
        });

        let id = self.inner.mediator.subscribe(&topic, handler);
        debug!(target: "mediator.topics", topic = %topic, id = %id, "subscribed");
        self.inner.registry.lock().push(Subscription { topic, id });
        id
    }
}

impl fmt::Debug for Topics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topics")
            .field("prefix", &self.inner.prefix)
            .field("entity", &self.inner.entity)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
