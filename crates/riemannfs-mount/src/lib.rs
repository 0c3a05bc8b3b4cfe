//! FUSE mount for the Riemann event tree.
//!
//! ```text
//! /<host>/<service>/<field>
//! /.query/<filter>/<host>/<service>/<field>
//! ```
//!
//! The binary in `main.rs` wires [`EventFuse`] to an
//! [`EventFs`](riemannfs_kernel::EventFs) backed by a live
//! [`StoreHandle`](riemannfs_client::StoreHandle).

pub mod config;
pub mod constants;
pub mod errno;
pub mod fuse;
pub mod inode;

pub use config::{ConfigError, MountConfig, Owner};
pub use fuse::EventFuse;
