//! Riemann query client
//!
//! Talks the Riemann TCP protocol (length-prefixed protocol buffers) and
//! exposes a shared [`StoreHandle`] implementing the kernel's
//! [`QueryExecutor`](riemannfs_kernel::QueryExecutor).

pub mod actor;
pub mod connection;
pub mod constants;
pub mod proto;

use std::time::Duration;

use riemannfs_kernel::QueryError;

pub use actor::{spawn_actor, StoreHandle};
pub use connection::Connection;

use crate::constants::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, MAX_FRAME_LEN, QUERY_TIMEOUT};

/// Where and how to reach the Riemann server.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
    pub max_frame_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            connect_timeout: CONNECT_TIMEOUT,
            query_timeout: QUERY_TIMEOUT,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl StoreConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// `host:port`, suitable for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connect to Riemann and spawn the store actor.
///
/// The first connection is made eagerly so an unreachable server fails
/// here rather than on the first filesystem call. Must be called inside a
/// tokio runtime.
pub async fn connect(config: StoreConfig) -> Result<StoreHandle, ClientError> {
    let connection = Connection::open(&config).await?;
    Ok(spawn_actor(config, Some(connection)))
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("frame of {0} bytes exceeds limit")]
    FrameTooLarge(usize),
    #[error("server error: {0}")]
    Server(String),
    #[error("timed out")]
    Timeout,
    #[error("not connected to server")]
    NotConnected,
    #[error("store client shut down")]
    Shutdown,
}

impl ClientError {
    /// Whether the connection is unusable after this error.
    ///
    /// A server-side query error leaves the stream in a clean state; anything
    /// else may have left a partial frame behind.
    pub fn is_connection_fatal(&self) -> bool {
        !matches!(self, ClientError::Server(_) | ClientError::Shutdown)
    }
}

impl From<ClientError> for QueryError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Io(e) => QueryError::Transport(e.to_string()),
            ClientError::NotConnected => QueryError::Transport("not connected".into()),
            ClientError::Decode(e) => QueryError::Protocol(e.to_string()),
            ClientError::FrameTooLarge(n) => {
                QueryError::Protocol(format!("frame of {n} bytes exceeds limit"))
            }
            ClientError::Server(msg) => QueryError::Server(msg),
            ClientError::Timeout => QueryError::Timeout,
            ClientError::Shutdown => QueryError::Shutdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.address(), "localhost:5555");
        assert_eq!(config.max_frame_len, 64 * 1024 * 1024);
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            QueryError::from(ClientError::Server("bad".into())),
            QueryError::Server(ref m) if m == "bad"
        ));
        assert!(matches!(
            QueryError::from(ClientError::Timeout),
            QueryError::Timeout
        ));
        assert!(matches!(
            QueryError::from(ClientError::FrameTooLarge(9)),
            QueryError::Protocol(_)
        ));
    }

    #[test]
    fn test_fatal_errors() {
        assert!(!ClientError::Server("x".into()).is_connection_fatal());
        assert!(ClientError::Timeout.is_connection_fatal());
        assert!(ClientError::FrameTooLarge(1).is_connection_fatal());
    }
}
