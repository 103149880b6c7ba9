//! Registration with a discovery node.
//!
//! The client announces the local storage node once, then stores every peer
//! descriptor the discovery node streams back until it closes the
//! connection. Frames are applied in the order they arrive.

use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use zetanet_storage::{NodeStore, PeerStore};
use zetanet_types::{NodeConfig, NodeDescriptor};

use crate::connection::{connect, ConnectionConfig, NetworkError};
use crate::protocol::{
    read_frame, registration_frame, strip_delimiter, FrameRead, RegistrationFraming,
    MAX_FRAME_LEN,
};

/// Counters describing one registration exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Non-empty frames received.
    pub received: usize,
    /// Descriptors written and confirmed by read-back.
    pub stored: usize,
    /// Frames that did not decode into a descriptor.
    pub rejected: usize,
    /// Descriptors whose write or read-back failed.
    pub store_failures: usize,
}

pub struct RegistrationClient {
    discovery: NodeConfig,
    storage_node: NodeConfig,
    data_dir: PathBuf,
    framing: RegistrationFraming,
    connection: ConnectionConfig,
}

impl RegistrationClient {
    pub fn new(discovery: NodeConfig, storage_node: NodeConfig, data_dir: PathBuf) -> Self {
        Self {
            discovery,
            storage_node,
            data_dir,
            framing: RegistrationFraming::default(),
            connection: ConnectionConfig::default(),
        }
    }

    pub fn with_framing(mut self, framing: RegistrationFraming) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_connection_config(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Register with the discovery node and persist the peers it returns.
    ///
    /// Returns an error only when the exchange cannot start (store or
    /// connection unavailable). Bad frames and store failures inside the
    /// reply loop are logged and skipped.
    pub async fn register(&self) -> Result<RegistrationReport, NetworkError> {
        let store = NodeStore::open(&self.data_dir)?;
        let stream = connect(&self.discovery, &self.connection).await?;
        info!(
            "Connected to discovery node {} via {} endpoint {}",
            self.discovery.name,
            self.discovery.transport,
            self.discovery.endpoint()
        );

        let result = exchange(stream, &self.storage_node, self.framing, &store).await;
        if let Err(e) = store.close() {
            warn!("Failed to close nodes store: {}", e);
        }
        result
    }
}

/// Run the registration exchange on an established stream.
///
/// Only a failure to send the registration is an error. A read error after
/// that ends the reply loop like a close, keeping what was already stored.
pub async fn exchange<S, P>(
    stream: S,
    storage_node: &NodeConfig,
    framing: RegistrationFraming,
    store: &P,
) -> Result<RegistrationReport, NetworkError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: PeerStore + ?Sized,
{
    let mut stream = BufReader::new(stream);
    let request = registration_frame(storage_node, framing)?;
    stream.get_mut().write_all(&request).await?;
    stream.get_mut().flush().await?;
    debug!("Sent registration for {}", storage_node.endpoint());

    let mut report = RegistrationReport::default();
    let mut line = Vec::new();
    loop {
        let read = match read_frame(&mut stream, &mut line, MAX_FRAME_LEN).await {
            Ok(read) => read,
            Err(e) => {
                warn!("Reply stream from discovery node broke off: {}", e);
                break;
            }
        };

        match read {
            FrameRead::Eof => break,
            FrameRead::Oversized(len) => {
                warn!("Discarding oversized frame of {} bytes", len);
                report.received += 1;
                report.rejected += 1;
            }
            FrameRead::Frame => {
                let frame = strip_delimiter(&line);
                if frame.is_empty() {
                    continue;
                }
                report.received += 1;
                save_node(store, frame, &mut report);
            }
        }
    }

    info!(
        "Registration finished: {} received, {} stored, {} rejected, {} store failures",
        report.received, report.stored, report.rejected, report.store_failures
    );
    Ok(report)
}

fn save_node<P>(store: &P, frame: &[u8], report: &mut RegistrationReport)
where
    P: PeerStore + ?Sized,
{
    let node = match NodeDescriptor::from_slice(frame) {
        Ok(node) => node,
        Err(e) => {
            warn!("Discarding undecodable node frame: {}", e);
            report.rejected += 1;
            return;
        }
    };

    let key = node.key();
    if let Err(e) = store.upsert(&node, frame) {
        warn!("Failed to store node {}: {}", key, e);
        report.store_failures += 1;
        return;
    }

    match store.confirm(&key) {
        Ok(data) => {
            info!("Added node: {}", String::from_utf8_lossy(&data));
            report.stored += 1;
        }
        Err(e) => {
            warn!("Read-back of node {} failed: {}", key, e);
            report.store_failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;
    use zetanet_storage::StorageError;
    use zetanet_types::{Port, TransportType};

    /// In-memory peer store that can refuse writes or lose them before read-back.
    #[derive(Default)]
    struct MemoryPeers {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        refuse: Option<String>,
        lose: Option<String>,
    }

    impl PeerStore for MemoryPeers {
        fn upsert(&self, descriptor: &NodeDescriptor, raw: &[u8]) -> zetanet_storage::Result<()> {
            let key = descriptor.key();
            if self.refuse.as_deref() == Some(key.as_str()) {
                return Err(StorageError::Serialization(
                    serde_json::from_str::<u8>("disk full").unwrap_err(),
                ));
            }
            if self.lose.as_deref() != Some(key.as_str()) {
                self.entries.lock().insert(key, raw.to_vec());
            }
            Ok(())
        }

        fn confirm(&self, key: &str) -> zetanet_storage::Result<Vec<u8>> {
            self.entries
                .lock()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::ReadBackMissing(key.to_string()))
        }
    }

    /// Stream that serves `data`, then fails every further read with a reset.
    struct ResetAfter {
        data: Vec<u8>,
        pos: usize,
        written: Vec<u8>,
    }

    impl ResetAfter {
        fn new(data: impl Into<Vec<u8>>) -> Self {
            Self {
                data: data.into(),
                pos: 0,
                written: Vec::new(),
            }
        }
    }

    impl AsyncRead for ResetAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.pos >= self.data.len() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
            let start = self.pos;
            let n = buf.remaining().min(self.data.len() - start);
            buf.put_slice(&self.data[start..start + n]);
            self.pos += n;
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for ResetAfter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.written.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn storage_node() -> NodeConfig {
        NodeConfig {
            host: "192.0.2.10".to_string(),
            port: Port(7300),
            transport: TransportType::Tcp,
            country: "AU".to_string(),
            name: "storage".to_string(),
            path: "/srv".to_string(),
            key: None,
        }
    }

    fn frame(host: &str, port: u16) -> String {
        format!("{{\"Name\":\"{host}\",\"Host\":\"{host}\",\"Port\":\"{port}\"}}\n")
    }

    #[tokio::test]
    async fn test_store_failures_do_not_stop_the_loop() {
        let peers = MemoryPeers {
            refuse: Some("10.0.0.2:4002".to_string()),
            lose: Some("10.0.0.3:4003".to_string()),
            ..Default::default()
        };
        let (client, mut server) = tokio::io::duplex(1024);
        let replies = [
            frame("10.0.0.1", 4001),
            frame("10.0.0.2", 4002),
            frame("10.0.0.3", 4003),
            frame("10.0.0.4", 4004),
        ]
        .concat();
        let feeder = tokio::spawn(async move {
            server.write_all(replies.as_bytes()).await.unwrap();
        });

        let report = exchange(client, &storage_node(), RegistrationFraming::Tagged, &peers)
            .await
            .unwrap();
        feeder.await.unwrap();

        assert_eq!(report.received, 4);
        assert_eq!(report.stored, 2);
        assert_eq!(report.store_failures, 2);
        assert_eq!(report.rejected, 0);
        let entries = peers.entries.lock();
        assert!(entries.contains_key("10.0.0.1:4001"));
        assert!(entries.contains_key("10.0.0.4:4004"));
    }

    #[tokio::test]
    async fn test_reset_mid_stream_keeps_partial_report() {
        let peers = MemoryPeers::default();
        let mut stream = ResetAfter::new([frame("10.0.0.1", 4001), frame("10.0.0.2", 4002)].concat());

        let report = exchange(&mut stream, &storage_node(), RegistrationFraming::Tagged, &peers)
            .await
            .unwrap();

        assert_eq!(report.received, 2);
        assert_eq!(report.stored, 2);
        assert!(stream.written.starts_with(b"reg{"));
        assert_eq!(peers.entries.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected_and_loop_continues() {
        let peers = MemoryPeers::default();
        let mut replies = vec![b'x'; MAX_FRAME_LEN + 1];
        replies.push(b'\n');
        replies.extend_from_slice(frame("10.0.0.9", 4009).as_bytes());
        let mut stream = ResetAfter::new(replies);

        let report = exchange(&mut stream, &storage_node(), RegistrationFraming::Bare, &peers)
            .await
            .unwrap();

        assert_eq!(report.received, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.stored, 1);
    }
}
