use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultgate::config::VaultgateConfig;
use vaultgate::server;
use vaultgate::vault::Vault;

#[derive(Parser)]
#[command(name = "vaultgate", version, about = "Remote MCP gateway for Obsidian-style note vaults")]
struct Cli {
    /// Path to a config file (defaults to ~/.vaultgate/config.toml)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the gateway HTTP server
    Serve,
    /// Check upstream connectivity and print vault counts
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VaultgateConfig::load_from(path)?,
        None => VaultgateConfig::load()?,
    };

    // Initialize tracing with the configured log level, writing to stderr.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Check => {
            let vault = Vault::new(config)?;
            if !vault.health_check().await {
                anyhow::bail!(
                    "upstream is unreachable — check upstream.base_url and the API key"
                );
            }
            let structure = vault.structure(false).await?;
            println!(
                "upstream ok: {} notes in {} folders under {}",
                structure.total_notes, structure.total_folders, structure.root_path
            );
        }
    }

    Ok(())
}
