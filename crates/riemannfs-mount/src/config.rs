//! Mount configuration.

use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use fuser::MountOption;
use riemannfs_client::StoreConfig;
use riemannfs_kernel::QueryFailurePolicy;

use crate::constants::FS_NAME;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("mount point {0} does not exist")]
    MissingMountPoint(PathBuf),
    #[error("mount point {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot inspect mount point {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Owner reported for every node in the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

/// Everything needed to mount the event tree.
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub mount_point: PathBuf,
    pub allow_other: bool,
    pub policy: QueryFailurePolicy,
    pub store: StoreConfig,
}

impl MountConfig {
    pub fn new(mount_point: impl Into<PathBuf>, store: StoreConfig) -> Self {
        Self {
            mount_point: mount_point.into(),
            allow_other: false,
            policy: QueryFailurePolicy::default(),
            store,
        }
    }

    /// Check the mount point is an existing directory.
    ///
    /// Returns the directory's owner, which the mounted tree inherits.
    pub fn validate(&self) -> Result<Owner, ConfigError> {
        validate_mount_point(&self.mount_point)
    }

    /// FUSE options for a read-only, named mount.
    ///
    /// `fusermount` refuses `auto_unmount` for unprivileged users unless
    /// `allow_other` is also set, so it is only asked for alongside it.
    /// Otherwise the mount is torn down on Ctrl-C by the session guard.
    pub fn mount_options(&self) -> Vec<MountOption> {
        let mut options = vec![
            MountOption::RO,
            MountOption::FSName(FS_NAME.to_owned()),
            MountOption::Subtype(FS_NAME.to_owned()),
            MountOption::DefaultPermissions,
        ];
        if self.allow_other {
            options.push(MountOption::AllowOther);
            options.push(MountOption::AutoUnmount);
        }
        options
    }
}

pub fn validate_mount_point(path: &Path) -> Result<Owner, ConfigError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::MissingMountPoint(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory(path.to_path_buf()));
    }
    Ok(Owner {
        uid: metadata.uid(),
        gid: metadata.gid(),
    })
}
