//! Subcommand handlers. Command results go to stdout, diagnostics to the log.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, warn};
use zetanet_files::{lookup, AddPipeline, ContentHash, ADD_FAILED};
use zetanet_network::TcpContentAnnouncer;
use zetanet_storage::NodeStore;

use crate::NodeContext;

pub async fn add(ctx: &NodeContext, file: &Path, push: bool) -> Result<()> {
    let roles = ctx.roles()?;
    let announcer = TcpContentAnnouncer::new(roles.discovery.clone(), ctx.connection.clone());
    let pipeline = AddPipeline::new(ctx.content.clone(), roles.storage.clone(), announcer);

    match pipeline.add(file, push).await {
        Ok(outcome) => {
            println!("{}", outcome.reply());
            Ok(())
        }
        Err(e) => {
            error!("Adding {} failed: {}", file.display(), e);
            println!("{}", ADD_FAILED);
            Err(e.into())
        }
    }
}

pub fn hash(ctx: &NodeContext, file: &Path) -> Result<()> {
    let hash = ContentHash::of_file(ctx.content.algorithm, file)?;
    println!("Hash Command");
    println!("\tfilePath: {}", file.display());
    println!("\tContent Hash: {}", hash);
    Ok(())
}

pub fn get(ctx: &NodeContext, target: &str) -> Result<()> {
    let hash = if ContentHash::is_hex_hash(target) {
        ContentHash::from_hex(target)?
    } else {
        ContentHash::of_file(ctx.content.algorithm, Path::new(target))?
    };

    match lookup(&ctx.content.data_dir, &hash)? {
        Some(descriptor) => {
            println!("{}", hash);
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        None => println!("content {} not found", hash),
    }
    Ok(())
}

pub fn peers(ctx: &NodeContext) -> Result<()> {
    let store = NodeStore::open(&ctx.content.data_dir).context("opening nodes store")?;
    let nodes = store.list()?;
    store.close()?;

    for node in &nodes {
        println!(
            "{}\t{}\t{}\t{}",
            node.key(),
            node.name,
            node.transport,
            node.country
        );
    }
    println!("{} known peers", nodes.len());
    Ok(())
}

pub fn remove(file_path: &str) {
    warn!("remove is not supported");
    println!("Remove Command");
    println!("\tfilePath: {}", file_path);
}

pub fn update(file: &str, dest: &str) {
    warn!("update is not supported");
    println!("Update Command");
    println!("\tfile: {}", file);
    println!("\tdest: {}", dest);
}
