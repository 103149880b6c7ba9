use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing endpoint components.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("port must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("unsupported transport type {0:?} (expected tcp, tcp4 or tcp6)")]
    UnsupportedTransport(String),
}

/// TCP/UDP style port number.
///
/// Peers written by other implementations encode the port as a JSON string,
/// so the port is always written as a string and accepted as either a string
/// or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PortRepr", into = "String")]
pub struct Port(pub u16);

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<PortRepr> for Port {
    type Error = EndpointError;

    fn try_from(value: PortRepr) -> Result<Self, Self::Error> {
        match value {
            PortRepr::Number(n) => u16::try_from(n)
                .map(Port)
                .map_err(|_| EndpointError::InvalidPort(n.to_string())),
            PortRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Port> for String {
    fn from(value: Port) -> Self {
        value.0.to_string()
    }
}

impl From<u16> for Port {
    fn from(value: u16) -> Self {
        Port(value)
    }
}

impl FromStr for Port {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .map(Port)
            .map_err(|_| EndpointError::InvalidPort(s.to_string()))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stream transport used to reach an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    #[default]
    Tcp,
    Tcp4,
    Tcp6,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Tcp => "tcp",
            TransportType::Tcp4 => "tcp4",
            TransportType::Tcp6 => "tcp6",
        }
    }
}

impl FromStr for TransportType {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(TransportType::Tcp),
            "tcp4" => Ok(TransportType::Tcp4),
            "tcp6" => Ok(TransportType::Tcp6),
            other => Err(EndpointError::UnsupportedTransport(other.to_string())),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity key of a node: `host` and `port` joined by a colon.
///
/// This is plain concatenation; IPv6 hosts are not bracketed.
pub fn endpoint_key(host: &str, port: Port) -> String {
    format!("{}:{}", host, port)
}
