//! Translation between kernel VFS values and FUSE/libc values.

use riemannfs_kernel::{OpenFlags, VfsError};

/// Errno reported to the caller for a VFS error.
pub fn errno(err: &VfsError) -> i32 {
    match err {
        VfsError::NotFound(_) | VfsError::FieldNotFound(_) => libc::ENOENT,
        VfsError::PermissionDenied(_) => libc::EPERM,
        VfsError::NotADirectory(_) => libc::ENOTDIR,
        VfsError::IsADirectory(_) => libc::EISDIR,
        VfsError::InvalidPath(_) => libc::EINVAL,
        VfsError::Query(_)
        | VfsError::InvariantViolation { .. }
        | VfsError::Serialize(_) => libc::EIO,
    }
}

/// Decode `open(2)` flags as delivered by FUSE.
pub fn open_flags(flags: i32) -> OpenFlags {
    let access = flags & libc::O_ACCMODE;
    OpenFlags {
        read: access == libc::O_RDONLY || access == libc::O_RDWR,
        write: access == libc::O_WRONLY || access == libc::O_RDWR,
        append: flags & libc::O_APPEND != 0,
        create: flags & libc::O_CREAT != 0,
        truncate: flags & libc::O_TRUNC != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riemannfs_kernel::QueryError;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(errno(&VfsError::not_found("/x")), libc::ENOENT);
        assert_eq!(errno(&VfsError::field_not_found("Bogus")), libc::ENOENT);
        assert_eq!(errno(&VfsError::permission_denied("/h/s/Host")), libc::EPERM);
        assert_eq!(errno(&VfsError::not_a_directory("/h/s/Host")), libc::ENOTDIR);
        assert_eq!(errno(&VfsError::is_a_directory("/h")), libc::EISDIR);
        assert_eq!(errno(&VfsError::invalid_path("/../x")), libc::EINVAL);
        assert_eq!(errno(&VfsError::Query(QueryError::Timeout)), libc::EIO);
        assert_eq!(
            errno(&VfsError::InvariantViolation {
                filter: "true".into(),
                count: 2
            }),
            libc::EIO
        );
    }

    #[test]
    fn test_read_only_open_has_no_write_intent() {
        let flags = open_flags(libc::O_RDONLY);
        assert!(flags.read);
        assert!(!flags.is_write_intent());

        // Flags that don't modify the file are ignored.
        let flags = open_flags(libc::O_RDONLY | libc::O_NONBLOCK | libc::O_CLOEXEC);
        assert!(!flags.is_write_intent());
    }

    #[test]
    fn test_write_intent_flags() {
        for flags in [
            libc::O_WRONLY,
            libc::O_RDWR,
            libc::O_RDONLY | libc::O_APPEND,
            libc::O_RDONLY | libc::O_CREAT,
            libc::O_RDONLY | libc::O_TRUNC,
        ] {
            assert!(open_flags(flags).is_write_intent(), "flags {flags:#o}");
        }

        let flags = open_flags(libc::O_RDWR);
        assert!(flags.read && flags.write);
    }
}
