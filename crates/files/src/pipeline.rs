//! The add pipeline: copy, hash, describe, record, announce.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zetanet_crypto::HashAlgorithm;
use zetanet_storage::ContentStore;
use zetanet_types::NodeConfig;

use crate::announce::ContentAnnouncer;
use crate::descriptor::{describe_hashed, ContentDescriptor, ContentHash};
use crate::error::FilesError;
use crate::universe::copy_to_universe;

/// Reply of an add that was not announced to the network.
pub const ADD_FAILED: &str = "content hashing: failed";

/// Where and how content is recorded locally.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    /// Directory holding the `db.contents` store.
    pub data_dir: PathBuf,
    /// Shared content directory files are copied into.
    pub universe_dir: PathBuf,
    pub algorithm: HashAlgorithm,
}

/// Result of a completed add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub hash: ContentHash,
    pub descriptor: ContentDescriptor,
    pub universe_path: PathBuf,
    /// Whether the discovery node was told about the content.
    pub announced: bool,
}

impl AddOutcome {
    /// The hash when the content was announced, otherwise [`ADD_FAILED`].
    ///
    /// The local `contents` entry exists in both cases.
    pub fn reply(&self) -> String {
        if self.announced {
            self.hash.to_hex()
        } else {
            ADD_FAILED.to_string()
        }
    }
}

pub struct AddPipeline<A> {
    settings: ContentSettings,
    storage_node: NodeConfig,
    announcer: A,
}

impl<A: ContentAnnouncer> AddPipeline<A> {
    pub fn new(settings: ContentSettings, storage_node: NodeConfig, announcer: A) -> Self {
        Self {
            settings,
            storage_node,
            announcer,
        }
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    /// Add `file` to the local content set and, if `push`, announce it.
    ///
    /// Filesystem and store failures abort the add. An announce failure
    /// only clears [`AddOutcome::announced`].
    pub async fn add(&self, file: &Path, push: bool) -> Result<AddOutcome, FilesError> {
        let settings = self.settings.clone();
        let storage_node = self.storage_node.clone();
        let source = file.to_path_buf();
        let recorded =
            tokio::task::spawn_blocking(move || record(&source, &settings, &storage_node))
                .await??;

        let announced = if push {
            match self
                .announcer
                .announce(&recorded.hash, &recorded.encoded)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to announce content {}: {:#}", recorded.hash, e);
                    false
                }
            }
        } else {
            false
        };

        Ok(AddOutcome {
            hash: recorded.hash,
            descriptor: recorded.descriptor,
            universe_path: recorded.universe_path,
            announced,
        })
    }
}

struct Recorded {
    hash: ContentHash,
    descriptor: ContentDescriptor,
    encoded: Vec<u8>,
    universe_path: PathBuf,
}

/// Copy, hash, describe and record `file`. Blocking.
///
/// The hash and length are taken from the universe copy, which is the
/// content the recorded endpoint serves.
fn record(
    file: &Path,
    settings: &ContentSettings,
    storage_node: &NodeConfig,
) -> Result<Recorded, FilesError> {
    let universe_path = copy_to_universe(file, &settings.universe_dir)?;
    info!("Copied {} to {}", file.display(), universe_path.display());

    let (hash, descriptor) =
        describe_hashed(&universe_path, file, settings.algorithm, storage_node)?;
    let encoded = descriptor.to_vec()?;

    let key = hash.to_hex();
    ContentStore::with_scoped(&settings.data_dir, |store| {
        store.put(&key, &encoded).map_err(FilesError::from)
    })?;
    info!("Recorded content {} ({} bytes)", key, descriptor.length);

    Ok(Recorded {
        hash,
        descriptor,
        encoded,
        universe_path,
    })
}

/// Look up the descriptor recorded for `hash` in the local `contents` store.
pub fn lookup(
    data_dir: &Path,
    hash: &ContentHash,
) -> Result<Option<ContentDescriptor>, FilesError> {
    ContentStore::with_scoped(data_dir, |store| {
        store
            .get(&hash.to_hex())?
            .map(|bytes| ContentDescriptor::from_slice(&bytes))
            .transpose()
    })
}
