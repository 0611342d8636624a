use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;

mod commands;
mod output;

use commands::*;
use docs_index::{HashingEmbedder, IndexManager};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Local documentation search CLI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the docsearch config file
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search indexed documentation
    Search(search::SearchCommand),

    /// Rebuild the index (all docsets, or a specific subset)
    Reindex(reindex::ReindexCommand),

    /// List docsets from the registry
    Docsets(docsets::DocsetsCommand),

    /// Open a section by its doc_ref
    Open(open::OpenCommand),

    /// Resolve a docset-relative asset path on disk
    AssetPath(asset_path::AssetPathCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("docsearch={log_level},docs_index={log_level}"))
        .with_target(false)
        .without_time()
        .init();

    let settings = match &cli.config {
        Some(path) => docsearch_config::load_settings_from(Some(path))?,
        None => docsearch_config::load_settings()?,
    };
    let manager = IndexManager::new(settings, Arc::new(HashingEmbedder::default()));

    let result = match &cli.command {
        Commands::Search(cmd) => cmd.execute(&manager),
        Commands::Reindex(cmd) => cmd.execute(&manager),
        Commands::Docsets(cmd) => cmd.execute(&manager),
        Commands::Open(cmd) => cmd.execute(&manager),
        Commands::AssetPath(cmd) => cmd.execute(&manager),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "docs_api_error");
        eprintln!("{} {}", "❌ Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
