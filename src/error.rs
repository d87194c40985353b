//! Error types for topic handlers and requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A handler fault, carried as the payload of an `error` topic.
///
/// `id` is the application-assigned correlation identifier. When present,
/// the error is also published on the correlated topic (`action:id`), so
/// listeners scoped to one request see only their own failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct TopicError {
    /// Human-readable description of the fault.
    pub message: String,
    /// Correlation identifier of the request that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TopicError {
    /// Create an error with no correlation identifier.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    /// Attach a correlation identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Encode as a bus payload.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::String(self.message.clone()))
    }

    /// Decode an `error` topic payload.
    ///
    /// Payloads published by something other than a [`Topics`](crate::Topics)
    /// namespace are accepted leniently: a string becomes the message, an
    /// object contributes `message`/`error` and `id` when they are present,
    /// anything else is rendered as JSON text.
    pub fn from_payload(payload: &Value) -> Self {
        if let Ok(error) = serde_json::from_value::<TopicError>(payload.clone()) {
            return error;
        }
        match payload {
            Value::String(message) => Self::new(message.clone()),
            Value::Object(fields) => {
                let message = fields
                    .get("message")
                    .or_else(|| fields.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| payload.to_string());
                let id = fields.get("id").and_then(identifier);
                Self { message, id }
            }
            other => Self::new(other.to_string()),
        }
    }

    pub(crate) fn from_panic(panic: &(dyn std::any::Any + Send)) -> Self {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(format!("handler panicked: {}", detail))
    }
}

impl From<serde_json::Error> for TopicError {
    fn from(err: serde_json::Error) -> Self {
        TopicError::new(format!("decode failed: {}", err))
    }
}

impl From<String> for TopicError {
    fn from(message: String) -> Self {
        TopicError::new(message)
    }
}

impl From<&str> for TopicError {
    fn from(message: &str) -> Self {
        TopicError::new(message)
    }
}

/// Why a request did not resolve to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The handler rejected the request.
    #[error("request failed: {0}")]
    Failed(TopicError),
    /// The namespace released the request's listeners before an outcome
    /// arrived (`unsubscribe_all` or drop).
    #[error("request cancelled before an outcome was published")]
    Cancelled,
    /// No outcome arrived within the allotted time.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
}

impl RequestError {
    /// The handler fault, if the request was rejected.
    pub fn topic_error(&self) -> Option<&TopicError> {
        match self {
            RequestError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopicError> for RequestError {
    fn from(err: TopicError) -> Self {
        RequestError::Failed(err)
    }
}

/// A string or numeric `id` rendered as a correlation identifier.
pub(crate) fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
