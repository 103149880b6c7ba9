//! Local persistence for zetanet nodes.
//!
//! Each logical namespace (`nodes`, `contents`) is its own sled database
//! directory under the node's data directory. There is no transactionality
//! across namespaces. Handles are meant to be scoped to the operation that
//! uses them: dropping or closing a handle flushes and releases the
//! directory lock, so the next operation can reopen it.

use sled::Db;
use std::path::{Path, PathBuf};

pub mod contents;
pub mod nodes;

pub use contents::ContentStore;
pub use nodes::{NodeStore, PeerStore};

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("failed to open {namespace} store at {path}: {source}")]
    Open {
        namespace: Namespace,
        path: PathBuf,
        #[source]
        source: sled::Error,
    },
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("key {0:?} not found after write")]
    ReadBackMissing(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A logical storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Nodes,
    Contents,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Nodes => "nodes",
            Namespace::Contents => "contents",
        }
    }

    /// Directory name of this namespace beneath a data directory.
    pub fn dir_name(&self) -> String {
        format!("db.{}", self.as_str())
    }

    pub fn path_in(&self, data_dir: impl AsRef<Path>) -> PathBuf {
        data_dir.as_ref().join(self.dir_name())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open handle on one namespace: an ordered byte-string store with
/// point lookups and overwrites.
pub struct SledNamespace {
    namespace: Namespace,
    db: Db,
}

impl SledNamespace {
    /// Open (creating if needed) the namespace beneath `data_dir`.
    pub fn open(namespace: Namespace, data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = namespace.path_in(data_dir);
        let db = sled::open(&path).map_err(|source| StorageError::Open {
            namespace,
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Opened {} store at {}", namespace, path.display());
        Ok(Self { namespace, db })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Insert or overwrite `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// All entries in key order.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.db
            .iter()
            .map(|r| {
                let (k, v) = r?;
                Ok((k.to_vec(), v.to_vec()))
            })
            .collect()
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Flush and release the handle.
    pub fn close(self) -> Result<()> {
        self.flush()?;
        tracing::debug!("Closed {} store", self.namespace);
        Ok(())
    }
}
