//! Handler replies and outcome propagation.
//!
//! A handler registered with [`Topics::on`] returns a [`Reply`]. Anything
//! other than [`Reply::None`] is republished once it settles:
//!
//! ```text
//! Ok(value)  -> done:<ns>:<action>          (always)
//!               done:<ns>:<action>:<id>     (value is a string, or an object with `id`)
//! Err(error) -> error:<ns>:<action>         (always)
//!               error:<ns>:<action>:<id>    (error.id is set)
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::namespace::Topics;
use super::topic::correlated;
use crate::error::{identifier, TopicError};

/// Boxed future produced by an asynchronous handler.
pub type ReplyFuture = Pin<Box<dyn Future<Output = Result<Value, TopicError>> + Send + 'static>>;

/// What a handler hands back to its namespace.
///
/// Closures returning `()` produce `Reply::None`; closures returning
/// `Result<Value, TopicError>` or `Value` produce `Reply::Ready`.
pub enum Reply {
    /// Fire-and-forget: nothing is published.
    None,
    /// Settled synchronously.
    Ready(Result<Value, TopicError>),
    /// Settles later; the outcome is published when the future completes.
    Pending(ReplyFuture),
}

impl Reply {
    /// Resolve with `value`.
    pub fn ok(value: impl Into<Value>) -> Self {
        Reply::Ready(Ok(value.into()))
    }

    /// Reject with `error`.
    pub fn err(error: impl Into<TopicError>) -> Self {
        Reply::Ready(Err(error.into()))
    }

    /// Settle asynchronously on the ambient tokio runtime.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, TopicError>> + Send + 'static,
    {
        Reply::Pending(Box::pin(future))
    }

    /// True for fire-and-forget replies.
    pub fn is_none(&self) -> bool {
        matches!(self, Reply::None)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::None => f.write_str("Reply::None"),
            Reply::Ready(result) => f.debug_tuple("Reply::Ready").field(result).finish(),
            Reply::Pending(_) => f.write_str("Reply::Pending(..)"),
        }
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::None
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Ready(Ok(value))
    }
}

impl From<TopicError> for Reply {
    fn from(error: TopicError) -> Self {
        Reply::Ready(Err(error))
    }
}

impl From<Result<Value, TopicError>> for Reply {
    fn from(result: Result<Value, TopicError>) -> Self {
        Reply::Ready(result)
    }
}

impl From<ReplyFuture> for Reply {
    fn from(future: ReplyFuture) -> Self {
        Reply::Pending(future)
    }
}

/// How a resolved value (or request payload) scopes its outcome topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    /// An object exposing a string or numeric `id`.
    Identifier(String),
    /// A plain string, used as its own identifier.
    Text(String),
    /// Nothing usable; only the uncorrelated topic fires.
    Opaque,
}

impl Correlation {
    /// Classify a resolved value.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Correlation::Text(s.clone()),
            Value::Object(fields) => match fields.get("id").and_then(identifier) {
                Some(id) => Correlation::Identifier(id),
                None => Correlation::Opaque,
            },
            _ => Correlation::Opaque,
        }
    }

    /// Classify a handler fault.
    pub fn of_error(error: &TopicError) -> Self {
        match &error.id {
            Some(id) => Correlation::Identifier(id.clone()),
            None => Correlation::Opaque,
        }
    }

    /// The identifier, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Correlation::Identifier(id) | Correlation::Text(id) => Some(id),
            Correlation::Opaque => None,
        }
    }
}

/// Act on a handler's reply for `action`.
pub(crate) fn settle(topics: &Topics, action: &str, reply: Reply) {
    match reply {
        Reply::None => {}
        Reply::Ready(outcome) => propagate(topics, action, outcome),
        Reply::Pending(future) => match Handle::try_current() {
            Ok(runtime) => {
                let topics = topics.clone();
                let action = action.to_string();
                runtime.spawn(async move {
                    let outcome = match tokio::spawn(future).await {
                        Ok(outcome) => outcome,
                        Err(join) if join.is_panic() => {
                            let error = TopicError::from_panic(join.into_panic().as_ref());
                            warn!(target: "mediator.topics", action = %action, error = %error, "async handler panicked");
                            Err(error)
                        }
                        Err(_) => Err(TopicError::new("handler task was cancelled")),
                    };
                    propagate(&topics, &action, outcome);
                });
            }
            Err(_) => {
                warn!(target: "mediator.topics", action, "async reply without a tokio runtime");
                propagate(
                    topics,
                    action,
                    Err(TopicError::new("no tokio runtime available for async handler")),
                );
            }
        },
    }
}

/// Publish a settled outcome on its `done`/`error` topics.
pub(crate) fn propagate(topics: &Topics, action: &str, outcome: Result<Value, TopicError>) {
    let config = topics.config();
    let (suffix, correlation, payload) = match outcome {
        Ok(value) => (&config.done_suffix, Correlation::of_value(&value), value),
        Err(error) => (&config.error_suffix, Correlation::of_error(&error), error.to_payload()),
    };

    debug!(
        target: "mediator.topics",
        action,
        outcome = %suffix,
        id = correlation.id().unwrap_or(""),
        "publishing outcome"
    );

    topics.publish_to(&topics.topic(action, Some(suffix)), payload.clone());
    if let Some(id) = correlation.id() {
        let scoped = correlated(&config.separator, action, id);
        topics.publish_to(&topics.topic(&scoped, Some(suffix)), payload);
    }
}
