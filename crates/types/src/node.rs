use serde::{Deserialize, Serialize};

use crate::endpoint::{endpoint_key, Port, TransportType};

/// A peer or discovery endpoint as announced by a discovery node.
///
/// Field names follow the PascalCase keys used on the wire. Lowercase keys
/// are accepted as well so descriptors can also be read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Host", alias = "host")]
    pub host: String,
    #[serde(rename = "Port", alias = "port")]
    pub port: Port,
    #[serde(rename = "Type", alias = "type", default)]
    pub transport: TransportType,
    #[serde(rename = "Country", alias = "country", default)]
    pub country: String,
    #[serde(rename = "Path", alias = "path", default)]
    pub path: String,
}

impl NodeDescriptor {
    /// Storage key of this node (`host:port`).
    pub fn key(&self) -> String {
        endpoint_key(&self.host, self.port)
    }

    /// Decode a descriptor from one received frame payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Configuration record for one node role (discovery endpoint or the local
/// storage node's own advertised endpoint). Read-only after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(rename = "Host", alias = "host")]
    pub host: String,
    #[serde(rename = "Port", alias = "port")]
    pub port: Port,
    #[serde(rename = "Type", alias = "type", default)]
    pub transport: TransportType,
    #[serde(rename = "Country", alias = "country", default)]
    pub country: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Path", alias = "path", default)]
    pub path: String,
    /// Optional node key. Never sent to the discovery node.
    #[serde(rename = "Key", alias = "key", default, skip_serializing)]
    pub key: Option<String>,
}

impl NodeConfig {
    /// Endpoint in `host:port` form.
    pub fn endpoint(&self) -> String {
        endpoint_key(&self.host, self.port)
    }

    /// The public part of this record, as other nodes will store it.
    pub fn to_descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
            transport: self.transport,
            country: self.country.clone(),
            path: self.path.clone(),
        }
    }

    /// Self-describing encoding used for the registration message.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
