//! `btree` - build and run behaviour tree definitions.
//!
//! - `btree run --tree <file>` - tick a tree against a scripted blackboard
//! - `btree check --tree <file>` - parse, validate and instantiate only

mod config;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use btree_builder::TreeBuilder;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::RunnerConfig;
use crate::runner::{load_definition, run, LoggingSink};

#[derive(Parser)]
#[command(name = "btree")]
#[command(about = "Build and run behaviour tree definitions", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick a tree against a scripted blackboard
    Run {
        /// Tree definition (JSON, or YAML with a .yaml/.yml extension)
        #[arg(short, long)]
        tree: PathBuf,

        /// Runner configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured tick limit
        #[arg(long)]
        ticks: Option<u64>,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final tree state as JSON
        #[arg(long)]
        snapshot: bool,
    },

    /// Parse, validate and instantiate a definition without running it
    Check {
        /// Tree definition (JSON, or YAML with a .yaml/.yml extension)
        #[arg(short, long)]
        tree: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            tree,
            config,
            ticks,
            seed,
            snapshot,
        } => {
            let mut config = match config {
                Some(path) => RunnerConfig::load(&path)?,
                None => RunnerConfig::default(),
            };
            if let Some(ticks) = ticks {
                config.ticks = ticks;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            run_tree(&tree, &config, snapshot)
        }
        Commands::Check { tree } => check_tree(&tree),
    }
}

fn run_tree(path: &Path, config: &RunnerConfig, snapshot: bool) -> Result<()> {
    tracing::info!(tree = %path.display(), seed = config.seed, "Running tree");

    let definition = load_definition(path)?;
    let mut tree = TreeBuilder::new()
        .with_options(config.tree_options())
        .build(&definition)
        .with_context(|| format!("Failed to build tree from {}", path.display()))?
        .with_trace_sink(Box::new(LoggingSink));
    let mut board = config.blackboard();

    let report = run(&mut tree, &mut board, config)?;
    println!(
        "{} after {} ticks ({} ms simulated)",
        report.state, report.ticks, report.elapsed_ms
    );

    if snapshot {
        println!("{}", serde_json::to_string_pretty(&tree.snapshot())?);
    }
    Ok(())
}

fn check_tree(path: &Path) -> Result<()> {
    let definition = load_definition(path)?;
    let builder = TreeBuilder::new();
    let catalog = builder
        .parse(&definition)
        .with_context(|| format!("Invalid tree definition in {}", path.display()))?;
    let tree = builder
        .build(&definition)
        .with_context(|| format!("Failed to build tree from {}", path.display()))?;

    println!("{}: ok", path.display());
    println!("  roots: {}", catalog.len());
    for name in catalog.names() {
        println!("    - {name}");
    }
    println!("  nodes: {}", tree.snapshot().node_count());
    Ok(())
}
