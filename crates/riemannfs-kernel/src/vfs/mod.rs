//! Path-based VFS surface driven by the mount.
//!
//! `open` hands back the whole content so the mount can keep one copy per
//! file handle; `read` is a sliced convenience on top of it.

mod error;
mod ops;
mod types;

pub use error::{VfsError, VfsResult};
pub use ops::{slice_at, VfsOps};
pub use types::{DirEntry, FileAttr, FileType, OpenFlags, StatFs, DIR_PERM, FILE_PERM};
