//! The event tree as a read-only [`VfsOps`] filesystem.
//!
//! Every call classifies the path, builds a filter, runs one query and
//! transforms the result. Nothing is cached, so every listing and read
//! reflects the index as it is right now.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::event::Event;
use crate::field;
use crate::listing;
use crate::path::{self, Node, Selector};
use crate::query;
use crate::store::{QueryExecutor, QueryFailurePolicy};
use crate::vfs::{DirEntry, FileAttr, OpenFlags, VfsError, VfsOps, VfsResult};

/// Read-only filesystem over a [`QueryExecutor`].
pub struct EventFs {
    store: Arc<dyn QueryExecutor>,
    policy: QueryFailurePolicy,
}

impl std::fmt::Debug for EventFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFs")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl EventFs {
    /// Create a filesystem with the lenient query-failure policy.
    pub fn new(store: Arc<dyn QueryExecutor>) -> Self {
        Self::with_policy(store, QueryFailurePolicy::default())
    }

    pub fn with_policy(store: Arc<dyn QueryExecutor>, policy: QueryFailurePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> QueryFailurePolicy {
        self.policy
    }

    /// Run a filter, applying the failure policy.
    async fn run(&self, filter: &str) -> VfsResult<Vec<Event>> {
        match self.store.query(filter).await {
            Ok(events) => {
                tracing::debug!(filter, count = events.len(), "query");
                Ok(events)
            }
            Err(e) => match self.policy {
                QueryFailurePolicy::Lenient => {
                    tracing::error!(filter, error = %e, "query failed, treating as empty");
                    Ok(Vec::new())
                }
                QueryFailurePolicy::Strict => {
                    tracing::error!(filter, error = %e, "query failed");
                    Err(e.into())
                }
            },
        }
    }

    /// The single event behind a selector, if any.
    async fn lookup(&self, selector: &Selector) -> VfsResult<Option<Event>> {
        let filter = query::selector_filter(selector);
        let events = self.run(&filter).await?;
        listing::at_most_one(events, &filter).inspect_err(|e| {
            tracing::error!(error = %e, "duplicate events for one host/service");
        })
    }

    /// Resolve a field node to its event and content.
    async fn resolve(&self, path: &Path, selector: &Selector, name: &str) -> VfsResult<(Event, Vec<u8>)> {
        let event = self
            .lookup(selector)
            .await?
            .ok_or_else(|| VfsError::not_found(path.display().to_string()))?;
        let content = field::resolve(&event, name)?;
        Ok((event, content))
    }
}

#[async_trait]
impl VfsOps for EventFs {
    async fn getattr(&self, path: &Path) -> VfsResult<FileAttr> {
        tracing::debug!(path = %path.display(), "getattr");
        match path::classify(path)? {
            Node::Field(selector, name) => {
                let (event, content) = self.resolve(path, &selector, &name).await?;
                Ok(FileAttr::file(content.len() as u64).with_event_time(event.time))
            }
            // Directories are not checked against the index.
            _ => Ok(FileAttr::directory()),
        }
    }

    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        tracing::debug!(path = %path.display(), "readdir");
        let node = path::classify(path)?;
        if let Node::Field(..) = node {
            return Err(VfsError::not_a_directory(path.display().to_string()));
        }
        let Some(filter) = query::filter_for(&node) else {
            return Ok(Vec::new());
        };

        let events = self.run(&filter).await?;
        let entries = match node {
            Node::Root => listing::root_entries(&events),
            Node::Hosts { .. } => listing::distinct_dirs(&events, |e| e.host.as_str()),
            Node::Services { .. } => listing::distinct_dirs(&events, |e| e.service.as_str()),
            Node::Record(_) => match listing::at_most_one(events, &filter)? {
                Some(event) => listing::record_entries(&event),
                None => Vec::new(),
            },
            Node::QueryRoot | Node::Field(..) => Vec::new(),
        };
        Ok(entries)
    }

    async fn open(&self, path: &Path, flags: OpenFlags) -> VfsResult<Vec<u8>> {
        tracing::debug!(path = %path.display(), ?flags, "open");
        if flags.is_write_intent() {
            return Err(VfsError::permission_denied(path.display().to_string()));
        }
        match path::classify(path)? {
            Node::Field(selector, name) => {
                let (_, content) = self.resolve(path, &selector, &name).await?;
                Ok(content)
            }
            _ => Err(VfsError::is_a_directory(path.display().to_string())),
        }
    }
}
