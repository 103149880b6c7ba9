//! The `contents` namespace: content hash -> serialized content descriptor.

use std::path::Path;

use crate::{Namespace, Result, SledNamespace};

pub struct ContentStore {
    inner: SledNamespace,
}

impl ContentStore {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            inner: SledNamespace::open(Namespace::Contents, data_dir)?,
        })
    }

    /// Open the store, run `f`, then close the store whatever `f` returned.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn with_scoped<T, E, F>(data_dir: impl AsRef<Path>, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&ContentStore) -> std::result::Result<T, E>,
        E: From<crate::StorageError>,
    {
        let store = Self::open(data_dir)?;
        let result = f(&store);
        let closed = store.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Insert or overwrite the descriptor stored for `hash`.
    pub fn put(&self, hash: &str, descriptor: &[u8]) -> Result<()> {
        self.inner.put(hash.as_bytes(), descriptor)
    }

    pub fn get(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(hash.as_bytes())
    }

    pub fn contains(&self, hash: &str) -> Result<bool> {
        self.inner.contains(hash.as_bytes())
    }

    /// Stored hashes in key order.
    pub fn hashes(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .entries()?
            .into_iter()
            .map(|(k, _)| String::from_utf8_lossy(&k).into_owned())
            .collect())
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
