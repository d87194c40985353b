//! Topic name composition.
//!
//! A composed topic reads `[suffix:]prefix-segments:entity:action`, where
//! `action` may itself carry a correlation id (`create:trever`). Missing
//! prefix or entity parts are skipped rather than left as empty segments.

/// Join the parts of a topic name.
///
/// `action` must be non-empty; an empty action would alias the namespace
/// itself.
pub(crate) fn compose(
    separator: &str,
    prefix: &[String],
    entity: Option<&str>,
    action: &str,
    suffix: Option<&str>,
) -> String {
    debug_assert!(!action.is_empty(), "topic action must not be empty");

    let parts = suffix
        .into_iter()
        .chain(prefix.iter().map(String::as_str))
        .chain(entity)
        .chain(std::iter::once(action));

    let mut topic = String::new();
    for part in parts {
        if !topic.is_empty() {
            topic.push_str(separator);
        }
        topic.push_str(part);
    }
    topic
}

/// Qualify `action` with a correlation id: `create` + `trever` -> `create:trever`.
pub(crate) fn correlated(separator: &str, action: &str, id: &str) -> String {
    format!("{}{}{}", action, separator, id)
}
