//! Content hash and self-describing descriptor data model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use zetanet_crypto::{HashAlgorithm, DIGEST_HEX_LEN, DIGEST_LEN};
use zetanet_types::NodeConfig;

use crate::error::FilesError;

/// Content address: the digest of a file's bytes.
///
/// Always 32 bytes, rendered as 64 lowercase hex characters. The hex form is
/// both the `contents` storage key and what is announced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; DIGEST_LEN]);

impl ContentHash {
    /// Hash the given data.
    pub fn from_data(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        Self(algorithm.hasher().hash_fixed(data))
    }

    /// Hash the content of the file at `path`.
    pub fn of_file(algorithm: HashAlgorithm, path: &Path) -> Result<Self, FilesError> {
        let mut file = File::open(path).map_err(|e| FilesError::from_io(path, e))?;
        algorithm
            .hasher()
            .hash_reader(&mut file)
            .map(Self)
            .map_err(|e| FilesError::from_io(path, e))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, FilesError> {
        if hex_str.len() != DIGEST_HEX_LEN {
            return Err(FilesError::InvalidHash(format!(
                "content hash must be {} hex characters, got {}",
                DIGEST_HEX_LEN,
                hex_str.len()
            )));
        }
        let bytes =
            hex::decode(hex_str).map_err(|e| FilesError::InvalidHash(format!("{e}")))?;
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether `s` looks like a hex content hash rather than a path.
    pub fn is_hex_hash(s: &str) -> bool {
        s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Self-describing metadata attached to a content hash.
///
/// Serialized as compact JSON with the short keys `fp`, `ha`, `le` and `ep`;
/// the same bytes are stored locally and announced to the discovery node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    /// Path of the file as it was given when added.
    #[serde(rename = "fp")]
    pub path: String,

    /// Hashing algorithm that produced the content hash.
    #[serde(rename = "ha")]
    pub algorithm: HashAlgorithm,

    /// Content length in bytes.
    #[serde(rename = "le")]
    pub length: u64,

    /// Endpoint (`host:port`) of the storage node holding the content.
    #[serde(rename = "ep")]
    pub endpoint: String,
}

impl ContentDescriptor {
    pub fn to_vec(&self) -> Result<Vec<u8>, FilesError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FilesError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Hash of the serialized descriptor itself.
    pub fn digest(&self, algorithm: HashAlgorithm) -> Result<ContentHash, FilesError> {
        Ok(ContentHash::from_data(algorithm, &self.to_vec()?))
    }
}

/// Build the descriptor of the file at `path`, advertised from the storage
/// node's own endpoint.
pub fn describe(
    path: &Path,
    algorithm: HashAlgorithm,
    storage_node: &NodeConfig,
) -> Result<ContentDescriptor, FilesError> {
    let file = File::open(path).map_err(|e| FilesError::from_io(path, e))?;
    let metadata = file.metadata().map_err(|source| FilesError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(FilesError::NotAFile(path.to_path_buf()));
    }

    Ok(ContentDescriptor {
        path: path.display().to_string(),
        algorithm,
        length: metadata.len(),
        endpoint: storage_node.endpoint(),
    })
}

/// Hash and describe `content` from one open handle.
///
/// The recorded length is the number of bytes hashed, so hash and length
/// always describe the same bytes. `recorded_as` is the path written into
/// the descriptor.
pub fn describe_hashed(
    content: &Path,
    recorded_as: &Path,
    algorithm: HashAlgorithm,
    storage_node: &NodeConfig,
) -> Result<(ContentHash, ContentDescriptor), FilesError> {
    let file = File::open(content).map_err(|e| FilesError::from_io(content, e))?;
    let metadata = file.metadata().map_err(|source| FilesError::Stat {
        path: content.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(FilesError::NotAFile(content.to_path_buf()));
    }

    let mut reader = CountingReader { inner: file, count: 0 };
    let digest = algorithm
        .hasher()
        .hash_reader(&mut reader)
        .map_err(|e| FilesError::from_io(content, e))?;

    let descriptor = ContentDescriptor {
        path: recorded_as.display().to_string(),
        algorithm,
        length: reader.count,
        endpoint: storage_node.endpoint(),
    };
    Ok((ContentHash(digest), descriptor))
}

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
