//! Filter expressions for each node of the tree.
//!
//! User filters from the advanced namespace are never parsed. They are
//! wrapped in parentheses whenever generated clauses are conjoined to them,
//! so `a or b` cannot swallow the host/service constraint.

use crate::path::{Node, Selector};

/// Matches every event in the index.
pub const MATCH_ALL: &str = "true";

/// Quote a value as a string literal of the query language.
///
/// Backslashes and double quotes are escaped so a host or service name
/// cannot terminate the literal early. Ordinary names pass through as-is.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `host = "<host>"`
pub fn host_clause(host: &str) -> String {
    format!("host = {}", quote(host))
}

/// `service = "<service>"`
pub fn service_clause(service: &str) -> String {
    format!("service = {}", quote(service))
}

fn conjoin(filter: Option<&str>, clauses: &[String]) -> String {
    let generated = clauses.join(" and ");
    match filter {
        Some(filter) => format!("({filter}) and {generated}"),
        None => generated,
    }
}

/// Filter listing the services of `host`, optionally narrowed by a user filter.
pub fn services_filter(filter: Option<&str>, host: &str) -> String {
    conjoin(filter, &[host_clause(host)])
}

/// Filter resolving the single event behind a selector.
pub fn selector_filter(selector: &Selector) -> String {
    conjoin(
        selector.filter.as_deref(),
        &[host_clause(&selector.host), service_clause(&selector.service)],
    )
}

/// Filter to run for a node, or `None` when the node never queries.
pub fn filter_for(node: &Node) -> Option<String> {
    match node {
        Node::Root => Some(MATCH_ALL.to_string()),
        Node::QueryRoot => None,
        Node::Hosts { filter } => Some(filter.clone()),
        Node::Services { filter, host } => Some(services_filter(filter.as_deref(), host)),
        Node::Record(selector) | Node::Field(selector, _) => Some(selector_filter(selector)),
    }
}
