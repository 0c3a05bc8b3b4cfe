//! FUSE adapter over a path-based [`VfsOps`].
//!
//! fuser drives the filesystem from its own session thread, so each call
//! blocks on the tokio runtime that owns the event store client. File
//! content is resolved once at `open` and served from the handle until
//! `release`, which keeps partial reads of one open consistent.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Handle;

use riemannfs_kernel::vfs::slice_at;
use riemannfs_kernel::{FileAttr, FileType, StatFs, VfsError, VfsOps, VfsResult};

use crate::config::Owner;
use crate::constants::{ATTR_TTL, BLOCK_SIZE};
use crate::errno::{errno, open_flags};
use crate::inode::{child_path, InodeTable};

/// One line of a directory listing: inode, kind, name.
pub type Listing = Vec<(u64, fuser::FileType, String)>;

pub struct EventFuse<V> {
    vfs: Arc<V>,
    runtime: Handle,
    owner: Owner,
    inodes: InodeTable,
    handles: HashMap<u64, Vec<u8>>,
    next_handle: u64,
}

impl<V: VfsOps> EventFuse<V> {
    pub fn new(vfs: V, runtime: Handle, owner: Owner) -> Self {
        Self {
            vfs: Arc::new(vfs),
            runtime,
            owner,
            inodes: InodeTable::new(),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    fn block_on<T>(&self, fut: impl Future<Output = VfsResult<T>>) -> VfsResult<T> {
        self.runtime.block_on(fut)
    }

    fn path_of(&self, inode: u64) -> Result<PathBuf, i32> {
        self.inodes.path_for(inode).ok_or(libc::ENOENT)
    }

    fn attr_for(&self, inode: u64, attr: &FileAttr) -> fuser::FileAttr {
        fuser::FileAttr {
            ino: inode,
            size: attr.size,
            blocks: attr.size.div_ceil(u64::from(BLOCK_SIZE)),
            atime: attr.mtime,
            mtime: attr.mtime,
            ctime: attr.mtime,
            crtime: attr.mtime,
            kind: fuse_kind(attr.kind),
            perm: attr.perm as u16,
            nlink: attr.nlink,
            uid: self.owner.uid,
            gid: self.owner.gid,
            rdev: 0,
            flags: 0,
            blksize: BLOCK_SIZE,
        }
    }

    /// Stat `path` through the VFS and give it an inode.
    ///
    /// A counted stat answers a kernel lookup and must later be forgotten.
    fn stat_path(&mut self, path: &Path, counted: bool) -> Result<fuser::FileAttr, i32> {
        let attr = self
            .block_on(self.vfs.getattr(path))
            .map_err(|e| failed("getattr", path, e))?;
        let inode = if counted {
            self.inodes.lookup(path, attr.kind)
        } else {
            self.inodes.insert(path, attr.kind)
        };
        Ok(self.attr_for(inode, &attr))
    }

    pub fn lookup_child(&mut self, parent: u64, name: &OsStr) -> Result<fuser::FileAttr, i32> {
        let path = child_path(&self.path_of(parent)?, name);
        self.stat_path(&path, true)
    }

    pub fn attr(&mut self, inode: u64) -> Result<fuser::FileAttr, i32> {
        let path = self.path_of(inode)?;
        self.stat_path(&path, false)
    }

    /// The kernel dropped `count` references to `inode`.
    pub fn forget_inode(&mut self, inode: u64, count: u64) {
        self.inodes.forget(inode, count);
    }

    pub fn known_inodes(&self) -> usize {
        self.inodes.len()
    }

    /// Full listing of a directory, `.` and `..` first.
    pub fn listing(&mut self, inode: u64) -> Result<Listing, i32> {
        let path = self.path_of(inode)?;
        let entries = self
            .block_on(self.vfs.readdir(&path))
            .map_err(|e| failed("readdir", &path, e))?;

        let mut listing = Vec::with_capacity(entries.len() + 2);
        listing.push((inode, fuser::FileType::Directory, ".".to_owned()));
        listing.push((
            self.inodes.parent_of(inode),
            fuser::FileType::Directory,
            "..".to_owned(),
        ));
        // Entries are not tracked until the kernel looks them up.
        for entry in entries {
            let child = match self.inodes.peek(&path.join(&entry.name)) {
                Some(known) => known,
                None => self.inodes.allocate(),
            };
            listing.push((child, fuse_kind(entry.kind), entry.name));
        }
        Ok(listing)
    }

    /// Resolve a file's content and keep it under a new handle.
    pub fn open_handle(&mut self, inode: u64, flags: i32) -> Result<u64, i32> {
        let path = self.path_of(inode)?;
        let content = self
            .block_on(self.vfs.open(&path, open_flags(flags)))
            .map_err(|e| failed("open", &path, e))?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, content);
        Ok(handle)
    }

    pub fn read_handle(&self, handle: u64, offset: i64, size: u32) -> Result<&[u8], i32> {
        let content = self.handles.get(&handle).ok_or(libc::EBADF)?;
        let offset = u64::try_from(offset).map_err(|_| libc::EINVAL)?;
        Ok(slice_at(content, offset, size))
    }

    pub fn release_handle(&mut self, handle: u64) {
        self.handles.remove(&handle);
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn stats(&self) -> Result<StatFs, i32> {
        self.block_on(self.vfs.statfs())
            .map_err(|e| failed("statfs", Path::new("/"), e))
    }
}

fn fuse_kind(kind: FileType) -> fuser::FileType {
    match kind {
        FileType::Directory => fuser::FileType::Directory,
        FileType::File => fuser::FileType::RegularFile,
    }
}

fn failed(op: &'static str, path: &Path, err: VfsError) -> i32 {
    if err.is_not_found() {
        tracing::debug!(op, path = %path.display(), "{err}");
    } else {
        tracing::warn!(op, path = %path.display(), "{err}");
    }
    errno(&err)
}

/// Entries of `listing` from `offset` on, each paired with the offset of
/// the entry after it.
pub fn page<T>(listing: Vec<T>, offset: i64) -> impl Iterator<Item = (i64, T)> {
    let start = usize::try_from(offset).unwrap_or(0);
    listing
        .into_iter()
        .enumerate()
        .skip(start)
        .map(|(idx, item)| (idx as i64 + 1, item))
}

impl<V: VfsOps + 'static> fuser::Filesystem for EventFuse<V> {
    fn lookup(
        &mut self,
        _req: &fuser::Request<'_>,
        parent: u64,
        name: &OsStr,
        reply: fuser::ReplyEntry,
    ) {
        match self.lookup_child(parent, name) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(code) => reply.error(code),
        }
    }

    fn forget(&mut self, _req: &fuser::Request<'_>, inode: u64, nlookup: u64) {
        self.forget_inode(inode, nlookup);
    }

    fn getattr(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        _fh: Option<u64>,
        reply: fuser::ReplyAttr,
    ) {
        match self.attr(inode) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(code) => reply.error(code),
        }
    }

    fn readdir(
        &mut self,
        _req: &fuser::Request<'_>,
        inode: u64,
        _fh: u64,
        offset: i64,
        mut reply: fuser::ReplyDirectory,
    ) {
        let listing = match self.listing(inode) {
            Ok(listing) => listing,
            Err(code) => {
                reply.error(code);
                return;
            }
        };
        for (next, (child, kind, name)) in page(listing, offset) {
            if reply.add(child, next, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &fuser::Request<'_>, inode: u64, flags: i32, reply: fuser::ReplyOpen) {
        match self.open_handle(inode, flags) {
            // Content may differ from the size the last getattr saw.
            Ok(handle) => reply.opened(handle, fuser::consts::FOPEN_DIRECT_IO),
            Err(code) => reply.error(code),
        }
    }

    fn read(
        &mut self,
        _req: &fuser::Request<'_>,
        _inode: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyData,
    ) {
        match self.read_handle(fh, offset, size) {
            Ok(data) => reply.data(data),
            Err(code) => reply.error(code),
        }
    }

    fn release(
        &mut self,
        _req: &fuser::Request<'_>,
        _inode: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: fuser::ReplyEmpty,
    ) {
        self.release_handle(fh);
        reply.ok();
    }

    fn statfs(&mut self, _req: &fuser::Request<'_>, _inode: u64, reply: fuser::ReplyStatfs) {
        match self.stats() {
            Ok(st) => reply.statfs(
                st.blocks, st.bfree, st.bavail, st.files, st.ffree, st.bsize, st.namelen,
                st.frsize,
            ),
            Err(code) => reply.error(code),
        }
    }
}
