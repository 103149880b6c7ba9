//! Wire protocol for talking to a discovery node.
//!
//! Every message is an opaque payload followed by a single `\n`. There is no
//! length prefix, checksum or version field. Payloads are compact JSON, which
//! never contains a raw newline.
//!
//! | message      | layout                                             |
//! |--------------|----------------------------------------------------|
//! | registration | `reg` ‖ JSON(node config) ‖ `\n` (tag optional)    |
//! | reply        | JSON(node descriptor) ‖ `\n`, repeated             |
//! | announce     | `add` ‖ 64 hex chars ‖ JSON(content descriptor) ‖ `\n` |

use std::fmt;
use std::io;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use zetanet_files::{ContentDescriptor, ContentHash};
use zetanet_types::NodeConfig;

/// Frame terminator.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Longest accepted inbound frame, delimiter excluded.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Length of the content hash inside an announce frame.
pub const ANNOUNCE_HASH_LEN: usize = 64;

/// Protocol errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame does not start with the {0:?} tag")]
    MissingTag(&'static str),
    #[error("frame too short: {0} bytes")]
    TooShort(usize),
    #[error("invalid content hash in frame: {0}")]
    InvalidHash(String),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("unknown registration framing {0:?} (expected tagged or bare)")]
    UnknownFraming(String),
}

/// Command tags prefixed to client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reg,
    Add,
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Reg => "reg",
            Command::Add => "add",
        }
    }
}

/// Whether the registration message carries the `reg` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationFraming {
    #[default]
    Tagged,
    Bare,
}

impl FromStr for RegistrationFraming {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tagged" => Ok(RegistrationFraming::Tagged),
            "bare" => Ok(RegistrationFraming::Bare),
            other => Err(ProtocolError::UnknownFraming(other.to_string())),
        }
    }
}

impl fmt::Display for RegistrationFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationFraming::Tagged => f.write_str("tagged"),
            RegistrationFraming::Bare => f.write_str("bare"),
        }
    }
}

fn concat_frame(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum::<usize>() + 1;
    let mut frame = Vec::with_capacity(len);
    for part in parts {
        frame.extend_from_slice(part);
    }
    frame.push(FRAME_DELIMITER);
    frame
}

/// Registration message announcing the local storage node.
pub fn registration_frame(
    storage_node: &NodeConfig,
    framing: RegistrationFraming,
) -> Result<Vec<u8>, serde_json::Error> {
    let payload = storage_node.to_vec()?;
    Ok(match framing {
        RegistrationFraming::Tagged => concat_frame(&[Command::Reg.tag().as_bytes(), &payload]),
        RegistrationFraming::Bare => concat_frame(&[&payload]),
    })
}

/// Parse a registration message in either framing.
pub fn parse_registration(frame: &[u8]) -> Result<NodeConfig, ProtocolError> {
    let body = strip_delimiter(frame);
    let payload = body
        .strip_prefix(Command::Reg.tag().as_bytes())
        .unwrap_or(body);
    Ok(serde_json::from_slice(payload)?)
}

/// Content announcement: tag, hex hash and serialized descriptor.
pub fn announce_frame(hash: &ContentHash, descriptor: &[u8]) -> Vec<u8> {
    let hex = hash.to_hex();
    concat_frame(&[Command::Add.tag().as_bytes(), hex.as_bytes(), descriptor])
}

/// Split an announce frame into its hash and descriptor.
pub fn parse_announce(frame: &[u8]) -> Result<(ContentHash, ContentDescriptor), ProtocolError> {
    let body = strip_delimiter(frame);
    let rest = body
        .strip_prefix(Command::Add.tag().as_bytes())
        .ok_or(ProtocolError::MissingTag(Command::Add.tag()))?;
    if rest.len() < ANNOUNCE_HASH_LEN {
        return Err(ProtocolError::TooShort(body.len()));
    }
    let (hash_hex, descriptor) = rest.split_at(ANNOUNCE_HASH_LEN);
    let hash_hex = std::str::from_utf8(hash_hex)
        .map_err(|e| ProtocolError::InvalidHash(e.to_string()))?;
    let hash =
        ContentHash::from_hex(hash_hex).map_err(|e| ProtocolError::InvalidHash(e.to_string()))?;
    Ok((hash, serde_json::from_slice(descriptor)?))
}

/// Outcome of reading one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRead {
    /// A frame is in the buffer, delimiter included when one was read.
    Frame,
    /// The frame exceeded the limit and its bytes were discarded.
    Oversized(usize),
    /// The stream ended before any byte of a new frame.
    Eof,
}

/// Read one frame into `buf`, never buffering more than `max_len` payload bytes.
///
/// A longer frame is drained up to the next delimiter and reported as
/// [`FrameRead::Oversized`] with its payload length. A trailing frame
/// without a delimiter is returned as a normal frame.
pub async fn read_frame<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<FrameRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut seen = 0usize;
    let mut oversized = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if oversized {
                FrameRead::Oversized(seen)
            } else if buf.is_empty() {
                FrameRead::Eof
            } else {
                FrameRead::Frame
            });
        }

        let (chunk, complete) = match available.iter().position(|b| *b == FRAME_DELIMITER) {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };
        let used = chunk.len();
        seen += if complete { used - 1 } else { used };
        if !oversized {
            if seen > max_len {
                oversized = true;
                buf.clear();
                buf.shrink_to_fit();
            } else {
                buf.extend_from_slice(chunk);
            }
        }
        reader.consume(used);

        if complete {
            return Ok(if oversized {
                FrameRead::Oversized(seen)
            } else {
                FrameRead::Frame
            });
        }
    }
}

/// Drop a trailing `\n` (and a `\r` before it).
pub(crate) fn strip_delimiter(frame: &[u8]) -> &[u8] {
    let frame = frame.strip_suffix(&[FRAME_DELIMITER]).unwrap_or(frame);
    frame.strip_suffix(b"\r").unwrap_or(frame)
}
