//! `on_done`: listening for resolved outcomes.

use mediator_topics::{Mediator, Topics};
use serde_json::json;

use crate::support::{users, Recorder};

#[test]
fn subscribes_to_a_namespaced_done_topic() {
    let (mediator, users) = users();
    let seen = Recorder::new();
    let sink = seen.clone();
    users.on_done("create", move |_, user| sink.push(user));

    mediator.publish(&users.topic("create", Some("done")), json!({ "id": "trever" }));

    assert_eq!(seen.seen(), vec![json!({ "id": "trever" })]);
}

#[test]
fn provides_itself_as_context() {
    let (mediator, users) = users();
    let expected = users.clone();
    let matched = Recorder::new();
    let sink = matched.clone();
    users.on_done("create", move |topics: &Topics, _| sink.push(topics.ptr_eq(&expected)));

    mediator.publish("done:wfm:cloud:user:create", json!({ "id": "trever" }));

    assert_eq!(matched.seen(), vec![true]);
}

#[test]
fn correlated_listener_ignores_other_ids() {
    let (mediator, users) = users();
    let seen = Recorder::new();
    let sink = seen.clone();
    users.on_done("create:trever", move |_, user| sink.push(user));

    mediator.publish("done:wfm:cloud:user:create:someone", json!({ "id": "someone" }));
    mediator.publish("done:wfm:cloud:user:create", json!({ "id": "trever" }));
    assert_eq!(seen.count(), 0);

    mediator.publish("done:wfm:cloud:user:create:trever", json!({ "id": "trever" }));
    assert_eq!(seen.count(), 1);
}
