//! Client configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default Riemann host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Riemann TCP port.
pub const DEFAULT_PORT: u16 = 5555;

/// Timeout for establishing the TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for one query round trip once connected.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest response frame accepted from the server (64 MiB).
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;
