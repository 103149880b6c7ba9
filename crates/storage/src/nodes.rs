//! The `nodes` namespace: peers learned from a discovery node, keyed by
//! `host:port`. The raw received descriptor bytes are stored unchanged.

use std::path::Path;
use zetanet_types::NodeDescriptor;

use crate::{Namespace, Result, SledNamespace, StorageError};

/// Write side of the known-peers namespace.
pub trait PeerStore {
    /// Write `raw` under the descriptor's key, replacing any earlier record.
    fn upsert(&self, descriptor: &NodeDescriptor, raw: &[u8]) -> Result<()>;

    /// Read back the bytes stored for `key`, failing if they are absent.
    fn confirm(&self, key: &str) -> Result<Vec<u8>>;
}

pub struct NodeStore {
    inner: SledNamespace,
}

impl NodeStore {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            inner: SledNamespace::open(Namespace::Nodes, data_dir)?,
        })
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key.as_bytes())
    }

    pub fn get(&self, key: &str) -> Result<Option<NodeDescriptor>> {
        self.get_raw(key)?
            .map(|v| NodeDescriptor::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    /// Every stored descriptor in key order. Records that no longer decode
    /// are skipped.
    pub fn list(&self) -> Result<Vec<NodeDescriptor>> {
        let mut nodes = Vec::new();
        for (key, value) in self.inner.entries()? {
            match NodeDescriptor::from_slice(&value) {
                Ok(node) => nodes.push(node),
                Err(e) => tracing::warn!(
                    "Skipping undecodable node record {}: {}",
                    String::from_utf8_lossy(&key),
                    e
                ),
            }
        }
        Ok(nodes)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn close(self) -> Result<()> {
        self.inner.close()
    }
}

impl PeerStore for NodeStore {
    fn upsert(&self, descriptor: &NodeDescriptor, raw: &[u8]) -> Result<()> {
        self.inner.put(descriptor.key().as_bytes(), raw)
    }

    fn confirm(&self, key: &str) -> Result<Vec<u8>> {
        self.inner
            .get(key.as_bytes())?
            .ok_or_else(|| StorageError::ReadBackMissing(key.to_string()))
    }
}
