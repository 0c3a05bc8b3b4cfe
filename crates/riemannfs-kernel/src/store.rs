//! The query boundary to the event index.
//!
//! The kernel never interprets filter expressions; it hands them to a
//! [`QueryExecutor`] and transforms whatever events come back.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::Event;

/// Failure reported by a [`QueryExecutor`].
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Connection could not be established or broke mid-query.
    #[error("transport error: {0}")]
    Transport(String),

    /// The index rejected the query (bad filter syntax, etc.).
    #[error("server error: {0}")]
    Server(String),

    /// The response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The query did not complete in time.
    #[error("query timed out")]
    Timeout,

    /// The executor has been shut down.
    #[error("store client shut down")]
    Shutdown,
}

/// Runs filter expressions against the event index.
///
/// Implementations must tolerate concurrent calls from many in-flight
/// filesystem requests.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Return every event matching `filter`, in index order.
    async fn query(&self, filter: &str) -> Result<Vec<Event>, QueryError>;
}

/// What to do when a query fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryFailurePolicy {
    /// Log the failure and treat it as an empty result set.
    #[default]
    Lenient,
    /// Propagate the failure to the filesystem caller.
    Strict,
}
