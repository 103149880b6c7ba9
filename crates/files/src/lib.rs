//! Zetanet content addressing
//!
//! Files added to the network are hashed, copied into the shared `universe`
//! directory and described by a self-describing [`ContentDescriptor`]
//! (path, hashing algorithm, length, originating endpoint). The
//! hash -> descriptor mapping is kept in the local `contents` store and can
//! optionally be announced to the discovery node through a
//! [`ContentAnnouncer`].

pub mod announce;
pub mod descriptor;
pub mod error;
pub mod pipeline;
pub mod universe;

pub use announce::ContentAnnouncer;
pub use descriptor::{describe, describe_hashed, ContentDescriptor, ContentHash};
pub use error::FilesError;
pub use pipeline::{lookup, AddOutcome, AddPipeline, ContentSettings, ADD_FAILED};
pub use universe::{copy_to_universe, default_universe_dir, UNIVERSE_DIR};

#[cfg(test)]
mod tests;
