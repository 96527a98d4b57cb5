//! `agentmem` command-line interface.
//!
//! Every subcommand prints JSON to stdout; logs go to stderr.

#![allow(clippy::print_stdout, reason = "CLI output")]

mod commands;

use std::path::PathBuf;

use agentmem_core::{MemoryConfig, ObservationType};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{query, record, session};

#[derive(Parser)]
#[command(name = "agentmem", version)]
#[command(about = "Persistent memory for AI coding agents", long_about = None)]
struct Cli {
    /// Database file (overrides AGENTMEM_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an observation
    Observe(record::ObserveArgs),
    /// Record a session summary
    Summarize(record::SummarizeArgs),
    /// Session lifecycle
    #[command(subcommand)]
    Session(session::SessionCommand),
    /// User prompts
    #[command(subcommand)]
    Prompt(session::PromptCommand),
    /// Project display names
    #[command(subcommand)]
    Project(session::ProjectCommand),
    /// Full-text search over observations and summaries
    Search {
        query: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short = 't', long = "type")]
        obs_type: Option<ObservationType>,
        /// Earliest creation time (RFC 3339 or epoch ms)
        #[arg(long, value_parser = query::parse_epoch)]
        since: Option<i64>,
        /// Latest creation time (RFC 3339 or epoch ms)
        #[arg(long, value_parser = query::parse_epoch)]
        until: Option<i64>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Ranked search combining full-text and vector similarity
    Hybrid {
        query: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Vector-similarity search only
    Semantic {
        query: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Recent observations and summaries for a project
    Context {
        project: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Observations by type and creation window, newest first
    Recent {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short = 't', long = "type")]
        obs_type: Option<ObservationType>,
        #[arg(long, value_parser = query::parse_epoch)]
        since: Option<i64>,
        #[arg(long, value_parser = query::parse_epoch)]
        until: Option<i64>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Fetch observations by id (at most 500)
    Get {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
    /// Observations around an anchor, in creation order
    Timeline {
        anchor: i64,
        #[arg(short, long, default_value = "5")]
        before: usize,
        #[arg(short, long, default_value = "5")]
        after: usize,
    },
    /// Observations that read or modified a file
    ByFile {
        path: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Paginated observation listing
    List {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Known projects
    Projects,
    /// Global counts, or one project's counts with --project
    Stats {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Embed observations that have no vector yet
    Backfill {
        #[arg(short, long)]
        batch: Option<usize>,
    },
    /// Embedding coverage and provider
    EmbeddingStats,
    /// Delete every stored vector
    ClearEmbeddings,
    /// Merge observations that modified the same files
    Consolidate {
        #[arg(long)]
        min_group: Option<usize>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Mark observations whose files changed on disk since creation
    DetectStale {
        /// Base directory for relative file paths
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Apply pending schema migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = MemoryConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    commands::run(cli.command, &config).await
}
