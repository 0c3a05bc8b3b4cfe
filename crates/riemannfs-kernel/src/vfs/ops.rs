//! The operations a mountable tree answers.

use async_trait::async_trait;
use std::path::Path;

use super::types::{DirEntry, FileAttr, OpenFlags, StatFs};
use super::VfsResult;

/// Read side of a path-based filesystem.
///
/// The mount adapter maps inodes to paths and calls in here. A leading `/`
/// is optional.
#[async_trait]
pub trait VfsOps: Send + Sync {
    async fn getattr(&self, path: &Path) -> VfsResult<FileAttr>;

    /// Every child of the directory at `path`, unpaginated.
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Resolve a file to its full content.
    ///
    /// Write-intent flags are refused before the path is resolved.
    async fn open(&self, path: &Path, flags: OpenFlags) -> VfsResult<Vec<u8>>;

    /// Up to `size` bytes of the file from `offset`, via a fresh `open`.
    async fn read(&self, path: &Path, offset: u64, size: u32) -> VfsResult<Vec<u8>> {
        let data = self.open(path, OpenFlags::read()).await?;
        Ok(slice_at(&data, offset, size).to_vec())
    }

    async fn statfs(&self) -> VfsResult<StatFs> {
        Ok(StatFs::default())
    }
}

/// Window of `data` starting at `offset`, at most `size` bytes long.
pub fn slice_at(data: &[u8], offset: u64, size: u32) -> &[u8] {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
    let end = start.saturating_add(size as usize).min(data.len());
    &data[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_at() {
        let data = b"hello world";
        assert_eq!(slice_at(data, 0, 5), b"hello");
        assert_eq!(slice_at(data, 6, 100), b"world");
        assert_eq!(slice_at(data, 11, 4), b"");
        assert_eq!(slice_at(data, 500, 4), b"");
    }
}
