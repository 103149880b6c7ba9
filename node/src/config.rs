//! Loading of the discovery-node and storage-node configuration records.
//!
//! Each role lives in its own YAML file under the configuration directory,
//! named `<role>.<profile>.yml` (or `<role>.yml` without a profile).
//! Environment variables prefixed `ZETANET_DN_` / `ZETANET_ST_` override
//! individual fields.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use std::path::{Path, PathBuf};
use zetanet_types::NodeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Discovery,
    Storage,
}

impl Role {
    fn file_stem(&self) -> &'static str {
        match self {
            Role::Discovery => "dn",
            Role::Storage => "st",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            Role::Discovery => "ZETANET_DN",
            Role::Storage => "ZETANET_ST",
        }
    }

    pub fn config_path(&self, config_dir: &Path, profile: &str) -> PathBuf {
        let profile = profile.trim();
        let file_name = if profile.is_empty() {
            format!("{}.yml", self.file_stem())
        } else {
            format!("{}.{}.yml", self.file_stem(), profile)
        };
        config_dir.join(file_name)
    }
}

/// Configuration records for both roles, loaded once per process.
#[derive(Debug, Clone)]
pub struct NodeRoles {
    pub discovery: NodeConfig,
    pub storage: NodeConfig,
}

impl NodeRoles {
    pub fn load(config_dir: &Path, profile: &str) -> Result<Self> {
        Ok(Self {
            discovery: load_role(config_dir, profile, Role::Discovery)?,
            storage: load_role(config_dir, profile, Role::Storage)?,
        })
    }
}

pub fn load_role(config_dir: &Path, profile: &str, role: Role) -> Result<NodeConfig> {
    let path = role.config_path(config_dir, profile);
    if !path.exists() {
        anyhow::bail!("Configuration file {} not found", path.display());
    }

    let config = Config::builder()
        .add_source(ConfigFile::from(path.as_path()))
        .add_source(Environment::with_prefix(role.env_prefix()))
        .build()
        .with_context(|| format!("reading configuration file {}", path.display()))?;

    config
        .try_deserialize::<NodeConfig>()
        .with_context(|| format!("invalid configuration in {}", path.display()))
}
