//! Namespace configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Naming and request settings shared by a namespace and everything derived
/// from it with `prefix` / `entity`.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use mediator_topics::TopicsConfig;
///
/// let config: TopicsConfig = serde_json::from_str(r#"{ "request_timeout_ms": 250 }"#).unwrap();
/// assert_eq!(config.separator, ":");
/// assert_eq!(config.request_timeout().map(|d| d.as_millis()), Some(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    /// Joins prefix segments, entity, action, correlation id and suffix.
    pub separator: String,
    /// Leading segment of topics carrying a resolved outcome.
    pub done_suffix: String,
    /// Leading segment of topics carrying a handler fault.
    pub error_suffix: String,
    /// Default deadline for `request`. `None` waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            separator: ":".to_string(),
            done_suffix: "done".to_string(),
            error_suffix: "error".to_string(),
            request_timeout_ms: None,
        }
    }
}

impl TopicsConfig {
    /// Set the default request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The default request deadline, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
