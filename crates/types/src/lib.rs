//! Shared data model for zetanet nodes.
//!
//! Peers learned from a discovery node are represented as [`NodeDescriptor`]s,
//! while a node's own advertised identity is a [`NodeConfig`]. Both are keyed
//! by their `host:port` endpoint.

pub mod endpoint;
pub mod node;

pub use endpoint::*;
pub use node::*;
