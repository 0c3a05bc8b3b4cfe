//! Node metadata exchanged between `EventFs` and the mount.
//!
//! Everything is addressed by path. Inode numbers belong to the mount.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Mode bits of every directory in the tree.
pub const DIR_PERM: u32 = 0o555;

/// Mode bits of every field file.
pub const FILE_PERM: u32 = 0o444;

/// Directories are hosts, services and records; files are fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    File,
    Directory,
}

impl FileType {
    pub fn is_dir(&self) -> bool {
        *self == FileType::Directory
    }
}

/// What `getattr` reports for a node.
#[derive(Debug, Clone)]
pub struct FileAttr {
    /// Byte length of the field content; zero for directories.
    pub size: u64,
    pub kind: FileType,
    pub perm: u32,
    /// Event time for fields, lookup time for directories.
    pub mtime: SystemTime,
    pub nlink: u32,
}

impl FileAttr {
    /// A field file holding `size` bytes.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            kind: FileType::File,
            perm: FILE_PERM,
            mtime: SystemTime::now(),
            nlink: 1,
        }
    }

    pub fn directory() -> Self {
        Self {
            size: 0,
            kind: FileType::Directory,
            perm: DIR_PERM,
            mtime: SystemTime::now(),
            nlink: 2,
        }
    }

    /// Use an event's time (seconds since the epoch) as mtime.
    ///
    /// Negative times keep the current time.
    pub fn with_event_time(mut self, secs: i64) -> Self {
        if let Ok(secs) = u64::try_from(secs) {
            self.mtime = UNIX_EPOCH + Duration::from_secs(secs);
        }
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// One child in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileType,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileType::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileType::Directory,
        }
    }
}

/// `statfs` answer. A query-backed tree has no capacity, so only the
/// geometry is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFs {
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub bsize: u32,
    pub namelen: u32,
    pub frsize: u32,
}

impl Default for StatFs {
    fn default() -> Self {
        Self {
            blocks: 0,
            bfree: 0,
            bavail: 0,
            files: 0,
            ffree: 0,
            bsize: 4096,
            namelen: 255,
            frsize: 4096,
        }
    }
}

/// Access requested by an `open`.
///
/// The default is a plain read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::read()
    }
}

impl OpenFlags {
    pub const fn read() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            create: false,
            truncate: false,
        }
    }

    pub const fn read_write() -> Self {
        Self {
            write: true,
            ..Self::read()
        }
    }

    /// Any of write, append, create or truncate.
    pub fn is_write_intent(&self) -> bool {
        self.write || self.append || self.create || self.truncate
    }
}
