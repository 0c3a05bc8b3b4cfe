//! Actor owning the Riemann connection.
//!
//! Provides a cloneable, `Send + Sync` [`StoreHandle`]. The actor task owns
//! the single TCP connection, runs queries one at a time in arrival order,
//! and reconnects lazily after any transport failure.
//!
//! ```text
//!   StoreHandle (Clone)          mpsc         StoreActor (tokio task)
//!   ┌───────────────────┐    ────────▶    ┌──────────────────────────┐
//!   │ .query(filter)    │                 │ Option<Connection>       │
//!   │ .shutdown()       │    ◀────────    │ reconnect on next query  │
//!   └───────────────────┘     oneshot     └──────────────────────────┘
//! ```

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use riemannfs_kernel::{Event, QueryError, QueryExecutor};

use crate::connection::Connection;
use crate::{ClientError, StoreConfig};

/// Internal command sent from StoreHandle → StoreActor via mpsc.
enum Command {
    Query {
        filter: String,
        reply: oneshot::Sender<Result<Vec<Event>, ClientError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the store actor.
///
/// Each query sends a command via mpsc and awaits the oneshot reply.
/// Clones share the same actor and connection.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl StoreHandle {
    /// Run a query through the actor.
    pub async fn query(&self, filter: &str) -> Result<Vec<Event>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Query {
                filter: filter.to_string(),
                reply,
            })
            .map_err(|_| ClientError::Shutdown)?;
        rx.await.map_err(|_| ClientError::Shutdown)?
    }

    /// Stop the actor and close its connection.
    ///
    /// Queries issued afterwards, from any clone, fail with `Shutdown`.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Returns true once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl QueryExecutor for StoreHandle {
    async fn query(&self, filter: &str) -> Result<Vec<Event>, QueryError> {
        StoreHandle::query(self, filter).await.map_err(QueryError::from)
    }
}

/// The actor holding the connection.
struct StoreActor {
    config: StoreConfig,
    /// Live connection (None = disconnected, will reconnect)
    connection: Option<Connection>,
}

impl StoreActor {
    fn new(config: StoreConfig, existing: Option<Connection>) -> Self {
        Self {
            config,
            connection: existing,
        }
    }

    /// Ensure we have a live connection, reconnecting if needed.
    async fn ensure_connected(&mut self) -> Result<&mut Connection, ClientError> {
        if self.connection.is_none() {
            log::info!("Reconnecting to Riemann at {}", self.config.address());
            self.connection = Some(Connection::open(&self.config).await?);
        }
        self.connection.as_mut().ok_or(ClientError::NotConnected)
    }

    /// Drop the connection so next query triggers reconnect.
    fn disconnect(&mut self) {
        self.connection = None;
    }

    async fn run_query(&mut self, filter: &str) -> Result<Vec<Event>, ClientError> {
        let query_timeout = self.config.query_timeout;
        let result = {
            let connection = self.ensure_connected().await?;
            match tokio::time::timeout(query_timeout, connection.query(filter)).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout),
            }
        };
        if let Err(e) = &result {
            if e.is_connection_fatal() {
                log::warn!("Query failed, will reconnect on next query: {e}");
                self.disconnect();
            }
        }
        result
    }

    /// Process commands until shutdown or until every handle is dropped.
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Query { filter, reply } => {
                    let result = self.run_query(&filter).await;
                    let _ = reply.send(result);
                }
                Command::Shutdown { reply } => {
                    rx.close();
                    self.disconnect();
                    let _ = reply.send(());
                    break;
                }
            }
        }
        log::debug!("Store actor shutting down");
    }
}

/// Spawn the store actor on the current tokio runtime.
///
/// `existing` lets the caller hand over a connection it already opened, so
/// startup can fail fast on an unreachable server.
pub fn spawn_actor(config: StoreConfig, existing: Option<Connection>) -> StoreHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = StoreActor::new(config, existing);
    tokio::spawn(actor.run(rx));
    StoreHandle { tx }
}
