//! Zetanet Network Core
//!
//! Line-framed exchange with a discovery node over a stream connection.
//!
//! ## Modules
//! - `protocol`: Frame layout, command tags, and frame parsers
//! - `connection`: Connection establishment with a bounded connect timeout
//! - `registration`: Self-announcement and persistence of the returned peers
//! - `announce`: One-shot announcement of newly added content

pub mod announce;
pub mod connection;
pub mod protocol;
pub mod registration;

// ------------------------------------------------------------
// Re-exports for workspace-wide use
// ------------------------------------------------------------

pub use announce::TcpContentAnnouncer;
pub use connection::{connect, ConnectionConfig, NetworkError};
pub use protocol::{
    announce_frame, parse_announce, parse_registration, read_frame, registration_frame, Command,
    FrameRead, ProtocolError, RegistrationFraming, FRAME_DELIMITER, MAX_FRAME_LEN,
};
pub use registration::{exchange, RegistrationClient, RegistrationReport};
