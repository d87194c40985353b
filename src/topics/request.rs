//! Request/response over the mediator.
//!
//! A request publishes on `topic(action)` and waits on a one-shot pair of
//! listeners for the matching outcome:
//!
//! ```text
//! request("find", Some("trever"))
//!   subscribe  done:<ns>:find:trever   ─┐ whichever fires first settles
//!   subscribe  error:<ns>:find:trever  ─┘ the request; both are released
//!   publish    <ns>:find  "trever"
//! ```
//!
//! Without an identifier the listeners sit on the bare `done`/`error`
//! topics and take the first outcome published for the action, which may
//! belong to a concurrent request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::namespace::Topics;
use super::outcome::Correlation;
use super::topic::correlated;
use crate::bus::SubscriptionId;
use crate::error::{RequestError, TopicError};

type Settlement = Result<Value, TopicError>;

/// Shared between the two listeners of one request.
struct PendingRequest {
    sender: Option<oneshot::Sender<Settlement>>,
    listeners: Vec<SubscriptionId>,
}

impl PendingRequest {
    /// Settle once; later calls only find nothing left to do.
    fn settle(pending: &Mutex<PendingRequest>, topics: &Topics, outcome: Settlement) {
        let (sender, listeners) = {
            let mut state = pending.lock();
            (state.sender.take(), std::mem::take(&mut state.listeners))
        };
        for id in listeners {
            topics.unsubscribe(id);
        }
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }
}

impl Topics {
    /// Publish `action` and wait for its outcome.
    ///
    /// With `id`, the id string is the payload and only outcomes correlated
    /// to it (`action:id`) settle the request. Without it the payload is
    /// `null` and the first uncorrelated outcome wins.
    ///
    /// Uses the namespace's default timeout, if configured. The publish
    /// happens before this returns; the future only waits.
    pub fn request(
        &self,
        action: &str,
        id: Option<&str>,
    ) -> impl Future<Output = Result<Value, RequestError>> + Send + 'static {
        let payload = id.map_or(Value::Null, |id| Value::String(id.to_string()));
        self.send_request(action, payload, self.config().request_timeout())
    }

    /// Like [`request`](Self::request), giving up after `timeout`.
    pub fn request_timeout(
        &self,
        action: &str,
        id: Option<&str>,
        timeout: Duration,
    ) -> impl Future<Output = Result<Value, RequestError>> + Send + 'static {
        let payload = id.map_or(Value::Null, |id| Value::String(id.to_string()));
        self.send_request(action, payload, Some(timeout))
    }

    /// Publish an arbitrary payload and wait for its outcome.
    ///
    /// The correlation id is taken from the payload itself: a string is its
    /// own id, an object contributes its `id` field.
    pub fn request_with(
        &self,
        action: &str,
        payload: Value,
    ) -> impl Future<Output = Result<Value, RequestError>> + Send + 'static {
        self.send_request(action, payload, self.config().request_timeout())
    }

    fn send_request(
        &self,
        action: &str,
        payload: Value,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Value, RequestError>> + Send + 'static {
        let scope = match Correlation::of_value(&payload).id() {
            Some(id) => correlated(&self.config().separator, action, id),
            None => action.to_string(),
        };

        let (sender, receiver) = oneshot::channel();
        let pending = Arc::new(Mutex::new(PendingRequest {
            sender: Some(sender),
            listeners: Vec::new(),
        }));

        let on_done = Arc::clone(&pending);
        let done = self.on_done(&scope, move |topics, value| {
            PendingRequest::settle(&on_done, topics, Ok(value))
        });
        let on_error = Arc::clone(&pending);
        let error = self.on_error(&scope, move |topics, error| {
            PendingRequest::settle(&on_error, topics, Err(error))
        });
        // A mediator may deliver during `subscribe`, before the ids are known.
        let settled = {
            let mut state = pending.lock();
            if state.sender.is_none() {
                true
            } else {
                state.listeners = vec![done, error];
                false
            }
        };
        drop(pending);
        if settled {
            self.unsubscribe(done);
            self.unsubscribe(error);
        }

        debug!(target: "mediator.topics", action, scope = %scope, "request");
        self.publish(action, payload);

        let namespace = self.downgrade();
        async move {
            let received = match timeout {
                Some(limit) => match tokio::time::timeout(limit, receiver).await {
                    Ok(received) => received,
                    Err(_) => {
                        warn!(target: "mediator.topics", scope = %scope, ?limit, "request timed out");
                        if let Some(topics) = namespace.upgrade() {
                            topics.unsubscribe(done);
                            topics.unsubscribe(error);
                        }
                        return Err(RequestError::TimedOut(limit));
                    }
                },
                None => receiver.await,
            };

            match received {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(fault)) => Err(RequestError::Failed(fault)),
                Err(_) => Err(RequestError::Cancelled),
            }
        }
    }
}
