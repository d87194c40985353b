//! Shared fixtures for the topics tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mediator_topics::{InMemoryMediator, Topics};
use tokio::sync::mpsc;

/// A fresh mediator and the `wfm:cloud` / `user` namespace over it.
pub fn users() -> (InMemoryMediator, Topics) {
    let mediator = InMemoryMediator::new();
    let topics = Topics::new(Arc::new(mediator.clone()))
        .prefix("wfm:cloud")
        .entity("user");
    (mediator, topics)
}

/// Collects whatever a listener is handed.
#[derive(Clone)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, value: T) {
        self.seen.lock().unwrap().push(value);
    }

    pub fn seen(&self) -> Vec<T> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// Wait for the next value on `rx`, failing the test after a second.
pub async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a publication")
        .expect("channel closed")
}
