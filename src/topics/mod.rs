//! Topics - hierarchical topic names, outcome propagation and
//! request/response correlation.
//!
//! A namespace composes topic strings as
//! `[outcome:]prefix-segments:entity:action[:correlation]`:
//!
//! ```text
//! wfm:cloud:user:create               handlers registered with `on`
//! done:wfm:cloud:user:create          every resolved outcome
//! done:wfm:cloud:user:create:trever   outcomes correlated to `trever`
//! error:wfm:cloud:user:create         every fault
//! error:wfm:cloud:user:create:trever  faults carrying `id = trever`
//! ```

mod config;
mod namespace;
mod outcome;
mod request;
mod topic;

pub use config::TopicsConfig;
pub use namespace::Topics;
pub use outcome::{Correlation, Reply, ReplyFuture};
