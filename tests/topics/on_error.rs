//! `on_error`: listening for handler faults.

use mediator_topics::{Mediator, TopicError, Topics};
use serde_json::json;

use crate::support::{users, Recorder};

#[test]
fn subscribes_to_a_namespaced_error_topic() {
    let (mediator, users) = users();
    let seen = Recorder::new();
    let sink = seen.clone();
    users.on_error("create", move |_, e| sink.push(e.message));

    mediator.publish(
        &users.topic("create", Some("error")),
        TopicError::new("kaboom").to_payload(),
    );

    assert_eq!(seen.seen(), vec!["kaboom".to_string()]);
}

#[test]
fn provides_itself_as_context() {
    let (mediator, users) = users();
    let expected = users.clone();
    let matched = Recorder::new();
    let sink = matched.clone();
    users.on_error("create", move |topics: &Topics, _| sink.push(topics.ptr_eq(&expected)));

    mediator.publish("error:wfm:cloud:user:create", TopicError::new("kaboom").to_payload());

    assert_eq!(matched.seen(), vec![true]);
}

#[test]
fn accepts_foreign_error_payloads() {
    let (mediator, users) = users();
    let seen = Recorder::new();
    let sink = seen.clone();
    users.on_error("create", move |_, e| sink.push(e));

    mediator.publish("error:wfm:cloud:user:create", json!("kaboom"));
    mediator.publish("error:wfm:cloud:user:create", json!({ "error": "bang", "id": 3 }));

    assert_eq!(
        seen.seen(),
        vec![TopicError::new("kaboom"), TopicError::new("bang").with_id("3")]
    );
}
