//! Inode bookkeeping.
//!
//! The kernel VFS is path-based; FUSE speaks inodes. A looked-up path keeps
//! its number until the kernel forgets it, so browsing many `.query`
//! filters does not grow the table without bound.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use riemannfs_kernel::FileType;

use crate::constants::ROOT_INODE;

#[derive(Debug, Clone)]
pub struct InodeEntry {
    pub path: PathBuf,
    pub kind: FileType,
    /// Lookups the kernel has not yet forgotten.
    pub lookups: u64,
}

#[derive(Debug)]
pub struct InodeTable {
    by_inode: HashMap<u64, InodeEntry>,
    by_path: HashMap<PathBuf, u64>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// A table holding only the root directory.
    pub fn new() -> Self {
        let mut table = Self {
            by_inode: HashMap::new(),
            by_path: HashMap::new(),
            next_inode: ROOT_INODE + 1,
        };
        table.insert(Path::new("/"), FileType::Directory);
        table
    }

    /// Inode for `path`, allocating one on first sight.
    ///
    /// A known path keeps its number; only its kind is refreshed.
    pub fn insert(&mut self, path: &Path, kind: FileType) -> u64 {
        if let Some(&existing) = self.by_path.get(path) {
            if let Some(entry) = self.by_inode.get_mut(&existing) {
                entry.kind = kind;
            }
            return existing;
        }
        let inode = if path == Path::new("/") {
            ROOT_INODE
        } else {
            let inode = self.next_inode;
            self.next_inode = self.next_inode.saturating_add(1);
            inode
        };
        self.by_inode.insert(
            inode,
            InodeEntry {
                path: path.to_path_buf(),
                kind,
                lookups: 0,
            },
        );
        self.by_path.insert(path.to_path_buf(), inode);
        inode
    }

    /// Like [`insert`](Self::insert), and counts one kernel reference.
    pub fn lookup(&mut self, path: &Path, kind: FileType) -> u64 {
        let inode = self.insert(path, kind);
        if let Some(entry) = self.by_inode.get_mut(&inode) {
            entry.lookups = entry.lookups.saturating_add(1);
        }
        inode
    }

    /// Drop `count` kernel references; the entry goes away at zero.
    ///
    /// The root is never removed.
    pub fn forget(&mut self, inode: u64, count: u64) {
        if inode == ROOT_INODE {
            return;
        }
        let Some(entry) = self.by_inode.get_mut(&inode) else {
            return;
        };
        entry.lookups = entry.lookups.saturating_sub(count);
        if entry.lookups == 0 {
            let path = entry.path.clone();
            self.by_inode.remove(&inode);
            self.by_path.remove(&path);
        }
    }

    /// Known inode of `path`, without allocating.
    pub fn peek(&self, path: &Path) -> Option<u64> {
        self.by_path.get(path).copied()
    }

    /// A fresh number that is not tracked.
    ///
    /// Used for listing entries the kernel has not looked up yet; a later
    /// lookup of the same path gets its own tracked number.
    pub fn allocate(&mut self) -> u64 {
        let inode = self.next_inode;
        self.next_inode = self.next_inode.saturating_add(1);
        inode
    }

    pub fn get(&self, inode: u64) -> Option<&InodeEntry> {
        self.by_inode.get(&inode)
    }

    pub fn path_for(&self, inode: u64) -> Option<PathBuf> {
        self.get(inode).map(|entry| entry.path.clone())
    }

    /// Inode of the directory containing `inode`. The root is its own parent.
    pub fn parent_of(&self, inode: u64) -> u64 {
        self.get(inode)
            .and_then(|entry| entry.path.parent())
            .and_then(|parent| self.by_path.get(parent).copied())
            .unwrap_or(ROOT_INODE)
    }

    pub fn len(&self) -> usize {
        self.by_inode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_inode.is_empty()
    }
}

/// Path of `name` inside `parent`.
pub fn child_path(parent: &Path, name: &OsStr) -> PathBuf {
    parent.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_preallocated() {
        let table = InodeTable::new();
        let root = table.get(ROOT_INODE).unwrap();
        assert_eq!(root.path, Path::new("/"));
        assert!(root.kind.is_dir());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_same_path_same_inode() {
        let mut table = InodeTable::new();
        let a = table.insert(Path::new("/web1"), FileType::Directory);
        let b = table.insert(Path::new("/web1/cpu"), FileType::Directory);
        assert_ne!(a, b);
        assert_ne!(a, ROOT_INODE);
        assert_eq!(table.insert(Path::new("/web1"), FileType::Directory), a);
        assert_eq!(table.insert(Path::new("/"), FileType::Directory), ROOT_INODE);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_forget_drops_entry_at_zero() {
        let mut table = InodeTable::new();
        let path = Path::new("/.query/state = \"critical\"");
        let ino = table.lookup(path, FileType::Directory);
        assert_eq!(table.lookup(path, FileType::Directory), ino);
        assert_eq!(table.get(ino).unwrap().lookups, 2);

        table.forget(ino, 1);
        assert!(table.get(ino).is_some());
        table.forget(ino, 1);
        assert!(table.get(ino).is_none());
        assert_eq!(table.peek(path), None);
        assert_eq!(table.len(), 1);

        // A new lookup gets a new number.
        assert_ne!(table.lookup(path, FileType::Directory), ino);
    }

    #[test]
    fn test_root_never_forgotten() {
        let mut table = InodeTable::new();
        table.forget(ROOT_INODE, 100);
        assert!(table.get(ROOT_INODE).is_some());
        table.forget(4242, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_allocate_is_untracked() {
        let mut table = InodeTable::new();
        let spare = table.allocate();
        assert!(table.get(spare).is_none());
        let ino = table.insert(Path::new("/web1"), FileType::Directory);
        assert_ne!(ino, spare);
    }

    #[test]
    fn test_kind_refreshed() {
        let mut table = InodeTable::new();
        let ino = table.insert(Path::new("/x"), FileType::File);
        table.insert(Path::new("/x"), FileType::Directory);
        assert!(table.get(ino).unwrap().kind.is_dir());
    }

    #[test]
    fn test_parent_of() {
        let mut table = InodeTable::new();
        let host = table.insert(Path::new("/web1"), FileType::Directory);
        let service = table.insert(Path::new("/web1/cpu"), FileType::Directory);
        assert_eq!(table.parent_of(service), host);
        assert_eq!(table.parent_of(host), ROOT_INODE);
        assert_eq!(table.parent_of(ROOT_INODE), ROOT_INODE);
        assert_eq!(table.parent_of(999), ROOT_INODE);
    }

    #[test]
    fn test_child_path() {
        assert_eq!(
            child_path(Path::new("/"), OsStr::new("web1")),
            PathBuf::from("/web1")
        );
        assert_eq!(
            child_path(Path::new("/.query/true"), OsStr::new("web1")),
            PathBuf::from("/.query/true/web1")
        );
    }
}
