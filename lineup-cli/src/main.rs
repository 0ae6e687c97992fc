//! Lineup: regenerate speaker and session pages from a submissions dataset.
//!
//! # Usage
//!
//! ```text
//! lineup generate [--force] [--dry-run] [--json]
//! lineup diff
//! lineup ledger show [--json]
//! lineup ledger check
//! ```
//!
//! Every command accepts `--root <dir>` (default: current directory) and
//! `-v`/`-vv` for more log output. `RUST_LOG` overrides the verbosity flags.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, generate::GenerateArgs, ledger::LedgerCommand};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "lineup",
    version,
    about = "Regenerate conference speaker and session pages from a submissions dataset",
    long_about = None,
)]
struct Cli {
    /// Project root holding `lineup.yaml`, the dataset and the ledger.
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, update and prune pages so they match the dataset.
    Generate(GenerateArgs),

    /// Show unified diffs of what `generate` would write.
    Diff(DiffArgs),

    /// Inspect the short-code ledger.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("could not determine current directory")?,
    };
    tracing::debug!("project root: {}", root.display());

    match cli.command {
        Commands::Generate(args) => args.run(&root),
        Commands::Diff(args) => args.run(&root),
        Commands::Ledger { command } => commands::ledger::run(command, &root),
    }
}
