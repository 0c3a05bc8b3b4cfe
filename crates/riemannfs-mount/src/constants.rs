//! Mount configuration constants.

use std::time::Duration;

/// Inode of the mount root. Fixed by the FUSE protocol.
pub const ROOT_INODE: u64 = 1;

/// How long the kernel may cache attributes and lookups.
pub const ATTR_TTL: Duration = Duration::from_secs(1);

/// Filesystem name shown in the mount table.
pub const FS_NAME: &str = "riemannfs";

/// Block size reported in attributes.
pub const BLOCK_SIZE: u32 = 512;
