//! Errors surfaced to filesystem callers.

use std::io;
use thiserror::Error;

use crate::store::QueryError;

#[derive(Debug, Error)]
pub enum VfsError {
    /// The path names no node, or no event backs it.
    #[error("no such node: {0}")]
    NotFound(String),

    /// Neither a fixed event field nor an attribute key.
    #[error("no such field: {0}")]
    FieldNotFound(String),

    /// Open with write intent. The tree never changes.
    #[error("read-only: {0}")]
    PermissionDenied(String),

    /// A field path was listed.
    #[error("field is not a directory: {0}")]
    NotADirectory(String),

    /// A directory path was opened.
    #[error("cannot open directory: {0}")]
    IsADirectory(String),

    /// `..` or a non-UTF-8 segment.
    #[error("unusable path: {0}")]
    InvalidPath(String),

    /// The event store query failed (strict policy only).
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    /// More than one event matched where a single (host, service) was expected.
    #[error("{count} events matched {filter:?}, expected at most one")]
    InvariantViolation { filter: String, count: usize },

    /// An event could not be rendered as JSON.
    #[error("cannot serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl VfsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound(field.into())
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// True for errors that mean "nothing lives here" to a filesystem caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_) | VfsError::FieldNotFound(_))
    }

    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            VfsError::NotFound(_) | VfsError::FieldNotFound(_) => io::ErrorKind::NotFound,
            VfsError::PermissionDenied(_) => io::ErrorKind::PermissionDenied,
            VfsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            VfsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            VfsError::InvalidPath(_) => io::ErrorKind::InvalidInput,
            VfsError::Query(QueryError::Timeout) => io::ErrorKind::TimedOut,
            VfsError::Query(_) | VfsError::InvariantViolation { .. } | VfsError::Serialize(_) => {
                io::ErrorKind::Other
            }
        }
    }
}

impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        io::Error::new(e.io_kind(), e.to_string())
    }
}

pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds() {
        let e: io::Error = VfsError::field_not_found("Bogus").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);
        assert_eq!(e.to_string(), "no such field: Bogus");

        let e: io::Error = VfsError::permission_denied("web1/cpu/Host").into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);

        let e: io::Error = VfsError::Query(QueryError::Timeout).into();
        assert_eq!(e.kind(), io::ErrorKind::TimedOut);

        let e: io::Error = VfsError::InvariantViolation {
            filter: "true".into(),
            count: 2,
        }
        .into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_invariant_message() {
        let e = VfsError::InvariantViolation {
            filter: "host = \"a\"".into(),
            count: 3,
        };
        assert_eq!(
            e.to_string(),
            "3 events matched \"host = \\\"a\\\"\", expected at most one"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(VfsError::not_found("x").is_not_found());
        assert!(VfsError::field_not_found("x").is_not_found());
        assert!(!VfsError::invalid_path("..").is_not_found());
    }
}
