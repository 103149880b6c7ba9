//! Hash functions for zetanet
//!
//! Provides the digest schemes usable as content addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Raw digest size shared by every supported algorithm.
pub const DIGEST_LEN: usize = 32;
/// Length of a digest rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

const READ_CHUNK: usize = 64 * 1024;

/// Hashing errors
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("unknown hashing algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Trait for hash functions
pub trait HashFunction {
    /// Hash input data and return a fixed-size array
    fn hash_fixed(&self, data: &[u8]) -> [u8; DIGEST_LEN];

    /// Hash everything readable from `reader`
    fn hash_reader(&self, reader: &mut dyn Read) -> io::Result<[u8; DIGEST_LEN]>;

    /// Get the name of the hash function
    fn name(&self) -> &'static str;
}

/// Blake3 hash implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3;

impl HashFunction for Blake3 {
    fn hash_fixed(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        *blake3::hash(data).as_bytes()
    }

    fn hash_reader(&self, reader: &mut dyn Read) -> io::Result<[u8; DIGEST_LEN]> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(*hasher.finalize().as_bytes())
    }

    fn name(&self) -> &'static str {
        "Blake3"
    }
}

/// SHA256 hash implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256;

impl HashFunction for Sha256 {
    fn hash_fixed(&self, data: &[u8]) -> [u8; DIGEST_LEN] {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let hash = hasher.finalize();
        let mut result = [0u8; DIGEST_LEN];
        result.copy_from_slice(&hash);
        result
    }

    fn hash_reader(&self, reader: &mut dyn Read) -> io::Result<[u8; DIGEST_LEN]> {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        let mut buffer = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        let hash = hasher.finalize();
        let mut result = [0u8; DIGEST_LEN];
        result.copy_from_slice(&hash);
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "SHA256"
    }
}

/// Identifier of a content hashing scheme, as carried in content descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    pub fn hasher(&self) -> &'static dyn HashFunction {
        match self {
            HashAlgorithm::Blake3 => &Blake3,
            HashAlgorithm::Sha256 => &Sha256,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blake3" => Ok(HashAlgorithm::Blake3),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(HashError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hash an in-memory input and return the hex digest.
pub fn hash(algorithm: HashAlgorithm, input: &[u8]) -> String {
    hex::encode(algorithm.hasher().hash_fixed(input))
}

/// Hash a stream and return the hex digest.
pub fn hash_reader(algorithm: HashAlgorithm, reader: &mut dyn Read) -> io::Result<String> {
    algorithm.hasher().hash_reader(reader).map(hex::encode)
}

/// Hash the content of the file at `path` and return the hex digest.
pub fn hash_file(algorithm: HashAlgorithm, path: impl AsRef<Path>) -> Result<String, HashError> {
    let path = path.as_ref();
    let io_err = |source| HashError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    hash_reader(algorithm, &mut file).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            hash(HashAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hash(HashAlgorithm::Blake3, b""),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_digest_width_is_fixed() {
        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
            assert_eq!(hash(algorithm, b"").len(), DIGEST_HEX_LEN);
            assert_eq!(hash(algorithm, &[7u8; 100_000]).len(), DIGEST_HEX_LEN);
        }
    }

    #[test]
    fn test_stream_matches_in_memory() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
            let streamed = hash_reader(algorithm, &mut data.as_slice()).unwrap();
            assert_eq!(streamed, hash(algorithm, &data));
        }
    }

    #[test]
    fn test_hash_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"report contents").unwrap();
        file.flush().unwrap();

        let digest = hash_file(HashAlgorithm::Blake3, file.path()).unwrap();
        assert_eq!(digest, hash(HashAlgorithm::Blake3, b"report contents"));
    }

    #[test]
    fn test_hash_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = hash_file(HashAlgorithm::Blake3, dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, HashError::Io { .. }));
    }

    #[test]
    fn test_algorithm_identifiers() {
        assert_eq!("BLAKE3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("md5".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::default().to_string(), "blake3");
    }

    proptest! {
        #[test]
        fn prop_identical_bytes_hash_identically(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let copy = data.clone();
            prop_assert_eq!(hash(HashAlgorithm::Blake3, &data), hash(HashAlgorithm::Blake3, &copy));
        }

        #[test]
        fn prop_single_byte_mutation_changes_hash(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut mutated = data.clone();
            let i = index.index(mutated.len());
            mutated[i] ^= flip;
            for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
                prop_assert_ne!(hash(algorithm, &data), hash(algorithm, &mutated));
            }
        }
    }
}
