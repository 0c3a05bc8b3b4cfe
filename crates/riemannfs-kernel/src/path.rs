//! Path grammar: classify a filesystem path into a node of the event tree.
//!
//! Two disjoint namespaces share one shape:
//!
//! ```text
//! plain:     <host>/<service>/<field>
//! advanced:  .query/<filter>/<host>/<service>/<field>
//! ```
//!
//! The advanced namespace adds one directory level (the filter) in front of
//! the host. A node is a file exactly one level past the service; anything
//! deeper does not exist.

use std::path::{Component, Path};

use crate::vfs::{FileType, VfsError, VfsResult};

/// Name of the advanced-namespace root directory.
pub const QUERY_DIR: &str = ".query";

/// Identifies the single event behind a `host/service` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// User filter from the advanced namespace, if any.
    pub filter: Option<String>,
    pub host: String,
    pub service: String,
}

/// A classified node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `/` - lists every host plus `.query`.
    Root,
    /// `/.query` - always empty.
    QueryRoot,
    /// `/.query/<filter>` - hosts matching the filter.
    Hosts { filter: String },
    /// `/<host>` or `/.query/<filter>/<host>` - services of one host.
    Services { filter: Option<String>, host: String },
    /// `/<host>/<service>` - fields of one event.
    Record(Selector),
    /// `/<host>/<service>/<field>` - one field's content.
    Field(Selector, String),
}

impl Node {
    /// Directory or file.
    pub fn kind(&self) -> FileType {
        match self {
            Node::Field(..) => FileType::File,
            _ => FileType::Directory,
        }
    }
}

/// Split a path into its name segments.
///
/// Root and `.` components are dropped. `..` and non-UTF-8 names are
/// rejected: the mount adapter only ever hands us resolved names.
pub fn segments(path: &Path) -> VfsResult<Vec<&str>> {
    let mut out = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(VfsError::invalid_path(path.display().to_string()));
            }
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| VfsError::invalid_path(path.display().to_string()))?;
                out.push(name);
            }
        }
    }
    Ok(out)
}

/// Classify a path.
pub fn classify(path: &Path) -> VfsResult<Node> {
    let segs = segments(path)?;
    classify_segments(&segs).ok_or_else(|| VfsError::not_found(path.display().to_string()))
}

/// Classify pre-split segments. `None` means the path is not part of the tree.
pub fn classify_segments(segs: &[&str]) -> Option<Node> {
    match segs {
        [] => Some(Node::Root),
        [q] if *q == QUERY_DIR => Some(Node::QueryRoot),
        [q, filter] if *q == QUERY_DIR => Some(Node::Hosts {
            filter: filter.to_string(),
        }),
        [q, filter, host] if *q == QUERY_DIR => Some(Node::Services {
            filter: Some(filter.to_string()),
            host: host.to_string(),
        }),
        [q, filter, host, service] if *q == QUERY_DIR => Some(Node::Record(Selector {
            filter: Some(filter.to_string()),
            host: host.to_string(),
            service: service.to_string(),
        })),
        [q, filter, host, service, field] if *q == QUERY_DIR => Some(Node::Field(
            Selector {
                filter: Some(filter.to_string()),
                host: host.to_string(),
                service: service.to_string(),
            },
            field.to_string(),
        )),
        [q, ..] if *q == QUERY_DIR => None,
        [host] => Some(Node::Services {
            filter: None,
            host: host.to_string(),
        }),
        [host, service] => Some(Node::Record(Selector {
            filter: None,
            host: host.to_string(),
            service: service.to_string(),
        })),
        [host, service, field] => Some(Node::Field(
            Selector {
                filter: None,
                host: host.to_string(),
                service: service.to_string(),
            },
            field.to_string(),
        )),
        _ => None,
    }
}
