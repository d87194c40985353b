//! Mediator - the publish/subscribe bus the topic layer sits on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Topics (per entity namespace)               │
//! │  - composes topic names                                     │
//! │  - on / on_done / on_error / request                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Mediator trait                         │
//! │  publish(topic, payload) / subscribe(topic, handler)        │
//! │  unsubscribe(id)                                            │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                    │
//!          ▼                                    ▼
//! ┌──────────────────┐              ┌───────────────────────────┐
//! │ InMemoryMediator │              │ host bus adapter          │
//! │   (included)     │              │   (external)              │
//! └──────────────────┘              └───────────────────────────┘
//! ```
//!
//! Payloads travel as `serde_json::Value`. A publish with nothing to say
//! carries `Value::Null`.

mod in_memory;
mod mediator;

pub use in_memory::InMemoryMediator;
pub use mediator::{Handler, Mediator, SubscriptionId};
