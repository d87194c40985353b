//! `unsubscribe_all` and subscription bookkeeping.

use std::sync::Arc;

use mediator_topics::{Mediator, RequestError, Topics};
use serde_json::{json, Value};

use crate::support::{users, Recorder};

#[test]
fn no_handler_runs_after_unsubscribe_all() {
    let (mediator, users) = users();
    let calls = Recorder::new();
    let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());
    users.on("create", move |_, _| a.push("on"));
    users.on_done("create", move |_, _| b.push("done"));
    users.on_error("create", move |_, _| c.push("error"));
    assert_eq!(users.subscription_count(), 3);

    assert_eq!(users.unsubscribe_all(), 3);

    users.publish("create", json!({ "id": "trever" }));
    mediator.publish(&users.done_topic("create"), Value::Null);
    mediator.publish(&users.error_topic("create"), json!("kaboom"));
    assert_eq!(calls.count(), 0);
    assert!(mediator.is_empty());
}

#[test]
fn unsubscribe_all_is_repeatable() {
    let (_, users) = users();
    users.on("create", |_, _| {});

    assert_eq!(users.unsubscribe_all(), 1);
    assert_eq!(users.unsubscribe_all(), 0);
    assert_eq!(users.subscription_count(), 0);
}

#[test]
fn other_namespaces_on_the_same_mediator_are_untouched() {
    let (mediator, users) = users();
    let twin = Topics::new(Arc::new(mediator.clone())).prefix("wfm:cloud").entity("user");

    let calls = Recorder::new();
    let sink = calls.clone();
    twin.on("create", move |_, _| sink.push(()));
    users.on("create", |_, _| {});

    users.unsubscribe_all();
    users.publish("create", Value::Null);

    assert_eq!(calls.count(), 1);
    assert_eq!(twin.subscribed_topics(), vec!["wfm:cloud:user:create".to_string()]);
}

#[test]
fn single_subscription_can_be_released() {
    let (_, users) = users();
    let calls = Recorder::new();
    let (a, b) = (calls.clone(), calls.clone());
    let first = users.on("create", move |_, _| a.push(1));
    users.on("create", move |_, _| b.push(2));

    assert!(users.unsubscribe(first));
    users.publish("create", Value::Null);
    assert_eq!(calls.seen(), vec![2]);
}

#[tokio::test]
async fn pending_requests_are_cancelled() {
    let (mediator, users) = users();
    let pending = users.request("find", Some("trever"));
    assert_eq!(mediator.len(), 2);

    users.unsubscribe_all();

    assert_eq!(pending.await, Err(RequestError::Cancelled));
    assert!(mediator.is_empty());
}

#[test]
fn dropping_the_namespace_releases_its_subscriptions() {
    let (mediator, users) = users();
    users.on("create", |_, _| {});
    users.on_done("create", |_, _| {});
    assert_eq!(mediator.len(), 2);

    drop(users);
    assert!(mediator.is_empty());
}
