//! Topic namespaces over a publish/subscribe mediator.
//!
//! ```
//! use std::sync::Arc;
//! use mediator_topics::{InMemoryMediator, Topics, TopicError};
//! use serde_json::{json, Value};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let users = Topics::new(Arc::new(InMemoryMediator::new()))
//!     .prefix("wfm:cloud")
//!     .entity("user");
//!
//! users.on("find", |_topics, id: Value| -> Result<Value, TopicError> {
//!     Ok(json!({ "id": id, "name": "Trever" }))
//! });
//!
//! let user = users.request("find", Some("trever")).await.unwrap();
//! assert_eq!(user["name"], "Trever");
//! # });
//! ```

pub mod bus;
mod error;
mod topics;

pub use bus::{InMemoryMediator, Mediator, SubscriptionId};
pub use error::{RequestError, TopicError};
pub use topics::{Correlation, Reply, ReplyFuture, Topics, TopicsConfig};
