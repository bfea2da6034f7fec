//! # dram CLI
//!
//! ## Usage
//!
//! ```bash
//! dram --config ./config/dram.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dram recommend --user <name>` | Recommend from a bar-tracking user's collection |
//! | `dram recommend --collection <file>` | Recommend from a local JSON collection |
//! | `dram similar --bottle-id <id>` | Rank catalog bottles against one bottle |
//! | `dram reason --seed <id> --candidate <id>` | Explain a pair without embeddings |
//! | `dram serve` | Start the JSON HTTP server |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `dram=info`).

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dram::{commands, config, server};

/// dram: spirits recommendations from the bottles you already own.
#[derive(Parser)]
#[command(name = "dram", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dram.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend bottles based on a whole collection.
    ///
    /// Never fails because of the embedding provider: if similarity cannot
    /// be computed, a fixed fallback list is printed instead.
    #[command(group(ArgGroup::new("source").required(true).args(["user", "collection"])))]
    Recommend {
        /// Bar-tracking service username.
        #[arg(long)]
        user: Option<String>,

        /// JSON file containing an array of bottles.
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Rank catalog bottles by similarity to one catalog bottle.
    Similar {
        #[arg(long)]
        bottle_id: i64,

        /// Number of matches (defaults to `recommend.per_bottle_limit`).
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print the match reason for two catalog bottles.
    Reason {
        #[arg(long)]
        seed: i64,

        #[arg(long)]
        candidate: i64,
    },

    /// Start the JSON HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dram=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // `reason` only needs the catalog path; run it without a config file too.
    if let Commands::Reason { seed, candidate } = cli.command {
        let cfg = config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal());
        return commands::run_reason(&cfg, seed, candidate);
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Recommend {
            user,
            collection,
            json,
        } => {
            commands::run_recommend(&cfg, user.as_deref(), collection.as_deref(), json).await?;
        }
        Commands::Similar {
            bottle_id,
            limit,
            json,
        } => {
            commands::run_similar(&cfg, bottle_id, limit, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Reason { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
