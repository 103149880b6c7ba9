//! Connection establishment for discovery-node exchanges.
//!
//! Only the connect step is bounded by a timeout. Reads on an established
//! registration stream wait until the remote side closes it.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;
use zetanet_storage::StorageError;
use zetanet_types::{NodeConfig, TransportType};

use crate::protocol::ProtocolError;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out after {timeout:?} connecting to {endpoint}")]
    ConnectTimeout { endpoint: String, timeout: Duration },
    #[error("no {transport} address found for {endpoint}")]
    NoAddress {
        endpoint: String,
        transport: TransportType,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
        }
    }
}

fn matches_transport(addr: &SocketAddr, transport: TransportType) -> bool {
    match transport {
        TransportType::Tcp => true,
        TransportType::Tcp4 => addr.is_ipv4(),
        TransportType::Tcp6 => addr.is_ipv6(),
    }
}

/// Open a stream to `endpoint` using its configured transport.
///
/// Name resolution and every connect attempt share one deadline.
pub async fn connect(
    endpoint: &NodeConfig,
    config: &ConnectionConfig,
) -> Result<TcpStream, NetworkError> {
    let address = endpoint.endpoint();
    match timeout(config.connect_timeout, connect_inner(endpoint, &address)).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::ConnectTimeout {
            endpoint: address,
            timeout: config.connect_timeout,
        }),
    }
}

async fn connect_inner(endpoint: &NodeConfig, address: &str) -> Result<TcpStream, NetworkError> {
    let connect_err = |source| NetworkError::Connect {
        endpoint: address.to_string(),
        source,
    };

    let candidates: Vec<SocketAddr> = lookup_host(address)
        .await
        .map_err(connect_err)?
        .filter(|addr| matches_transport(addr, endpoint.transport))
        .collect();

    let mut last_err = None;
    for addr in candidates {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                debug!("Connected to {} via {}", address, addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => connect_err(e),
        None => NetworkError::NoAddress {
            endpoint: address.to_string(),
            transport: endpoint.transport,
        },
    })
}
