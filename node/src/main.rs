//! Zetanet storage node
//!
//! Registers with the configured discovery node, then runs one content
//! command against the local stores.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zetanet_crypto::HashAlgorithm;
use zetanet_files::{default_universe_dir, ContentSettings};
use zetanet_network::{ConnectionConfig, RegistrationClient, RegistrationFraming};

mod commands;
mod config;
mod version;

use config::NodeRoles;
use version::{git_commit_hash, ZETANET_VERSION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser)]
#[command(name = "zetanet")]
#[command(about = "Zetanet storage node", long_about = None)]
#[command(version = ZETANET_VERSION)]
struct Cli {
    /// Directory holding dn.<env>.yml and st.<env>.yml
    #[arg(long, env = "CONFIG_PATH", default_value = "config")]
    config_dir: PathBuf,

    /// Configuration profile (the <env> part of the file names)
    #[arg(long, env = "ENV", default_value = "")]
    profile: String,

    /// Directory holding the db.nodes and db.contents stores
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Shared content directory (defaults to `universe` beside the executable)
    #[arg(long)]
    universe_dir: Option<PathBuf>,

    /// Connect timeout for discovery-node connections, in milliseconds
    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,

    /// Content hashing algorithm (blake3 or sha256)
    #[arg(long, default_value = "blake3")]
    hash_algorithm: HashAlgorithm,

    /// Registration message framing (tagged or bare)
    #[arg(long, default_value = "tagged")]
    registration_framing: RegistrationFraming,

    /// Skip registration with the discovery node
    #[arg(long)]
    skip_register: bool,

    /// Exit without waiting for a line on standard input
    #[arg(long)]
    no_wait: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a file to the network
    Add(AddCommand),
    /// Remove a file (not supported)
    Remove {
        /// Path of the file to be removed
        #[arg(long = "file-path", alias = "filePath")]
        file_path: String,
    },
    /// Update a file (not supported)
    Update {
        #[arg(long)]
        file: String,
        /// File path to be updated
        #[arg(long)]
        dest: String,
    },
    /// Show the recorded descriptor of a content hash or file
    Get {
        /// Content hash, or path of a file to hash first
        #[arg(long = "file-path", alias = "filePath")]
        file_path: String,
    },
    /// Print the content hash of a file
    Hash {
        #[arg(long = "file-path", alias = "filePath")]
        file_path: PathBuf,
    },
    /// List the peers learned from the discovery node
    Peers,
}

#[derive(Args)]
struct AddCommand {
    /// File to add
    #[arg(long)]
    file: PathBuf,
    /// Announce the content to the discovery node
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    push: bool,
}

/// Everything a command needs, resolved once at startup.
pub struct NodeContext {
    /// Discovery and storage records; absent when the files could not be loaded.
    pub roles: Option<NodeRoles>,
    pub content: ContentSettings,
    pub connection: ConnectionConfig,
}

impl NodeContext {
    /// The role records, for commands that talk to or advertise a node.
    pub fn roles(&self) -> Result<&NodeRoles> {
        self.roles
            .as_ref()
            .context("node configuration (dn/st files) is not loaded")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);
    info!(
        "Starting zetanet node {} ({})",
        ZETANET_VERSION,
        git_commit_hash()
    );

    let roles = match NodeRoles::load(&cli.config_dir, &cli.profile) {
        Ok(roles) => Some(roles),
        Err(e) => {
            warn!("Node configuration unavailable: {:#}", e);
            None
        }
    };
    let universe_dir = match &cli.universe_dir {
        Some(dir) => dir.clone(),
        None => default_universe_dir().context("locating the universe directory")?,
    };
    let ctx = NodeContext {
        roles,
        content: ContentSettings {
            data_dir: cli.data_dir.clone(),
            universe_dir,
            algorithm: cli.hash_algorithm,
        },
        connection: ConnectionConfig {
            connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
        },
    };

    match (&ctx.roles, cli.skip_register) {
        (Some(roles), false) => register(roles, &ctx, cli.registration_framing).await,
        (None, false) => warn!("Skipping registration: no node configuration"),
        (_, true) => {}
    }

    let Some(command) = cli.command else {
        eprintln!("expected 'add|update|remove|get|hash|peers' subcommands");
        std::process::exit(1);
    };

    match command {
        Commands::Add(cmd) => commands::add(&ctx, &cmd.file, cmd.push).await?,
        Commands::Remove { file_path } => commands::remove(&file_path),
        Commands::Update { file, dest } => commands::update(&file, &dest),
        Commands::Get { file_path } => commands::get(&ctx, &file_path)?,
        Commands::Hash { file_path } => commands::hash(&ctx, &file_path)?,
        Commands::Peers => commands::peers(&ctx)?,
    }

    if !cli.no_wait {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
    }

    Ok(())
}

/// Register once; failures are reported and never retried.
async fn register(roles: &NodeRoles, ctx: &NodeContext, framing: RegistrationFraming) {
    let client = RegistrationClient::new(
        roles.discovery.clone(),
        roles.storage.clone(),
        ctx.content.data_dir.clone(),
    )
    .with_framing(framing)
    .with_connection_config(ctx.connection.clone());

    match client.register().await {
        Ok(report) => info!("Registered with discovery node, {} peers stored", report.stored),
        Err(e) => warn!(
            "Registration with discovery node {} failed: {}",
            roles.discovery.endpoint(),
            e
        ),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}
