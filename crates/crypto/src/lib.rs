//! Content hashing for zetanet.
//!
//! Every content address is a 32-byte digest rendered as 64 lowercase hex
//! characters. The algorithm that produced it travels alongside it in the
//! content descriptor, so additional algorithms can be added without
//! changing the storage schema.

pub mod hash_functions;

pub use hash_functions::{
    hash, hash_file, hash_reader, Blake3, HashAlgorithm, HashError, HashFunction, Sha256,
    DIGEST_HEX_LEN, DIGEST_LEN,
};
