//! Hook for announcing new content to a discovery node.

use anyhow::Result;
use async_trait::async_trait;

use crate::descriptor::ContentHash;

/// Service that tells the network about a newly added content hash.
///
/// Implementations send the hash together with the serialized descriptor
/// and do not wait for a reply.
#[async_trait]
pub trait ContentAnnouncer: Send + Sync {
    async fn announce(&self, hash: &ContentHash, descriptor: &[u8]) -> Result<()>;
}

#[async_trait]
impl<T: ContentAnnouncer + ?Sized> ContentAnnouncer for &T {
    async fn announce(&self, hash: &ContentHash, descriptor: &[u8]) -> Result<()> {
        (**self).announce(hash, descriptor).await
    }
}
