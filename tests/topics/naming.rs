//! Topic name composition.

use std::sync::Arc;

use mediator_topics::{InMemoryMediator, Topics, TopicsConfig};

use crate::support::users;

#[test]
fn returns_a_namespaced_topic() {
    let (_, users) = users();
    assert_eq!(users.topic("create", None), "wfm:cloud:user:create");
}

#[test]
fn takes_an_optional_leading_suffix() {
    let (_, users) = users();
    assert_eq!(users.topic("create", Some("done")), "done:wfm:cloud:user:create");
    assert_eq!(users.done_topic("create"), "done:wfm:cloud:user:create");
    assert_eq!(users.error_topic("create"), "error:wfm:cloud:user:create");
}

#[test]
fn suffix_is_prepended_to_the_plain_topic() {
    let (_, users) = users();
    for action in ["create", "update", "find:trever"] {
        for suffix in ["done", "error", "custom"] {
            assert_eq!(
                users.topic(action, Some(suffix)),
                format!("{}:{}", suffix, users.topic(action, None))
            );
        }
    }
}

#[test]
fn chained_prefixes_match_a_single_joined_prefix() {
    let mediator = Arc::new(InMemoryMediator::new());
    let chained = Topics::new(mediator.clone()).prefix("wfm").prefix("cloud").entity("user");
    let joined = Topics::new(mediator.clone()).prefix("wfm:cloud").entity("user");
    let entity_first = Topics::new(mediator).entity("user").prefix("wfm").prefix("cloud");

    assert_eq!(chained.topic("create", None), joined.topic("create", None));
    assert_eq!(entity_first.topic("create", None), joined.topic("create", None));
}

#[test]
fn distinct_entities_and_actions_do_not_collide() {
    let (_, users) = users();
    let groups = users.entity("group");
    assert_ne!(users.topic("create", None), groups.topic("create", None));
    assert_ne!(users.topic("create", Some("done")), users.topic("create", Some("error")));
    assert_ne!(users.topic("create:x", None), users.topic("create", None));
}

#[test]
fn configured_separator_and_suffixes() {
    let config = TopicsConfig {
        separator: ".".to_string(),
        done_suffix: "ok".to_string(),
        error_suffix: "failed".to_string(),
        request_timeout_ms: None,
    };
    let users = Topics::with_config(Arc::new(InMemoryMediator::new()), config)
        .prefix("wfm")
        .entity("user");

    assert_eq!(users.topic("create", None), "wfm.user.create");
    assert_eq!(users.done_topic("create"), "ok.wfm.user.create");
    assert_eq!(users.error_topic("create"), "failed.wfm.user.create");
}
