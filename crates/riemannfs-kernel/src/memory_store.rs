//! Scripted in-memory query executor for tests.
//!
//! Answers exact filter strings with canned events. It does not evaluate
//! the query language; [`MemoryStore::index`] pre-scripts the filters the
//! plain namespace generates for a set of events.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::event::Event;
use crate::path::Selector;
use crate::query::{selector_filter, services_filter, MATCH_ALL};
use crate::store::{QueryError, QueryExecutor};

/// In-memory [`QueryExecutor`].
///
/// Unscripted filters return no events.
#[derive(Debug, Default)]
pub struct MemoryStore {
    responses: RwLock<HashMap<String, Vec<Event>>>,
    failing: AtomicBool,
    issued: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the plain-namespace filters (`true`, per host, per host and
    /// service) for `events`, plus `(true) and ...` variants for the
    /// advanced namespace with the match-all filter.
    pub fn index(events: Vec<Event>) -> Self {
        let store = Self::new();
        store.respond(MATCH_ALL, events.clone());

        let hosts: BTreeSet<&str> = events.iter().map(|e| e.host.as_str()).collect();
        for host in hosts {
            let of_host: Vec<Event> = events.iter().filter(|e| e.host == host).cloned().collect();
            store.respond(&services_filter(None, host), of_host.clone());
            store.respond(&services_filter(Some(MATCH_ALL), host), of_host.clone());

            let services: BTreeSet<&str> = of_host.iter().map(|e| e.service.as_str()).collect();
            for service in services {
                let matching: Vec<Event> = of_host
                    .iter()
                    .filter(|e| e.service == service)
                    .cloned()
                    .collect();
                for filter in [None, Some(MATCH_ALL)] {
                    let selector = Selector {
                        filter: filter.map(str::to_string),
                        host: host.to_string(),
                        service: service.to_string(),
                    };
                    store.respond(&selector_filter(&selector), matching.clone());
                }
            }
        }
        store
    }

    /// Answer `filter` with `events` from now on.
    pub fn respond(&self, filter: &str, events: Vec<Event>) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(filter.to_string(), events);
        }
    }

    /// Make every query fail with a transport error (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every filter received so far, in order.
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QueryExecutor for MemoryStore {
    async fn query(&self, filter: &str) -> Result<Vec<Event>, QueryError> {
        if let Ok(mut issued) = self.issued.lock() {
            issued.push(filter.to_string());
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::Transport("memory store set to fail".into()));
        }
        let responses = self
            .responses
            .read()
            .map_err(|_| QueryError::Transport("lock poisoned".into()))?;
        Ok(responses.get(filter).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_scripts_plain_filters() {
        let store = MemoryStore::index(vec![
            Event::new("web1", "cpu"),
            Event::new("web1", "mem"),
            Event::new("db1", "cpu"),
        ]);

        assert_eq!(store.query("true").await.unwrap().len(), 3);
        assert_eq!(store.query("host = \"web1\"").await.unwrap().len(), 2);
        assert_eq!(
            store
                .query("host = \"db1\" and service = \"cpu\"")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(store.query("host = \"nope\"").await.unwrap().is_empty());
        assert_eq!(store.issued().len(), 4);
    }

    #[tokio::test]
    async fn test_failing() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.query("true").await,
            Err(QueryError::Transport(_))
        ));
        store.set_failing(false);
        assert!(store.query("true").await.unwrap().is_empty());
    }
}
