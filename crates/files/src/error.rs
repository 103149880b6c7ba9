use std::io;
use std::path::{Path, PathBuf};
use zetanet_storage::StorageError;

/// Errors raised while describing, copying or recording content.
///
/// Every variant is fatal to the add operation that raised it.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("could not stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("content task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FilesError {
    /// Classify an error raised while opening or reading `path`.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => FilesError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FilesError::PermissionDenied(path.to_path_buf()),
            _ => FilesError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
