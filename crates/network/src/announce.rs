//! Content announcement over a fresh discovery-node connection.

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::info;
use zetanet_files::{ContentAnnouncer, ContentHash};
use zetanet_types::NodeConfig;

use crate::connection::{connect, ConnectionConfig};
use crate::protocol::announce_frame;

/// Announces content by writing one `add` frame per connection.
///
/// No reply is read. The stream is shut down and dropped on every path.
pub struct TcpContentAnnouncer {
    discovery: NodeConfig,
    connection: ConnectionConfig,
}

impl TcpContentAnnouncer {
    pub fn new(discovery: NodeConfig, connection: ConnectionConfig) -> Self {
        Self {
            discovery,
            connection,
        }
    }
}

#[async_trait]
impl ContentAnnouncer for TcpContentAnnouncer {
    async fn announce(&self, hash: &ContentHash, descriptor: &[u8]) -> Result<()> {
        let mut stream = connect(&self.discovery, &self.connection).await?;
        info!(
            "Sending content {} to discovery node {} via {} endpoint {}",
            hash,
            self.discovery.name,
            self.discovery.transport,
            self.discovery.endpoint()
        );

        let frame = announce_frame(hash, descriptor);
        stream.write_all(&frame).await?;
        stream.flush().await?;
        stream.shutdown().await?;
        Ok(())
    }
}
