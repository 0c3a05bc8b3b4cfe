//! riemannfs kernel
//!
//! Exposes a Riemann event index as a read-only directory tree:
//!
//! ```text
//! /                                   hosts + .query
//! /<host>                             services of host
//! /<host>/<service>                   fields of the event
//! /<host>/<service>/<field>           field content
//! /.query/<filter>/<host>/<service>/<field>
//! ```
//!
//! The pieces are plain functions: [`path`] classifies a path, [`query`]
//! builds the filter for it, [`listing`] turns events into directory
//! entries and [`field`] turns one event into file content. [`EventFs`]
//! strings them together behind the [`VfsOps`] trait.

pub mod event;
pub mod eventfs;
pub mod field;
pub mod listing;
pub mod path;
pub mod query;
pub mod store;
pub mod vfs;

#[cfg(any(test, feature = "test-mock"))]
pub mod memory_store;

pub use event::Event;
pub use eventfs::EventFs;
pub use path::{classify, Node, Selector, QUERY_DIR};
pub use store::{QueryError, QueryExecutor, QueryFailurePolicy};
pub use vfs::{DirEntry, FileAttr, FileType, OpenFlags, StatFs, VfsError, VfsOps, VfsResult};

#[cfg(any(test, feature = "test-mock"))]
pub use memory_store::MemoryStore;
