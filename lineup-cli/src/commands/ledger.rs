//! `lineup ledger`: inspect the short-code ledger.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use lineup_core::config::{self, ProjectPaths};
use lineup_core::ledger::{self, IdLedger};

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Print every issued code and the bucket counters.
    Show {
        /// Emit the ledger as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Verify ledger invariants; exits non-zero on any violation.
    Check,
}

#[derive(Tabled)]
struct CodeRow {
    code: String,
    key: String,
}

pub fn run(command: LedgerCommand, root: &Path) -> Result<()> {
    let config = config::load_at(root).context("failed to load lineup.yaml")?;
    let paths = ProjectPaths::resolve(root, &config);
    let ledger = ledger::load_at(&paths.ledger)
        .with_context(|| format!("failed to load ledger {}", paths.ledger.display()))?;

    match command {
        LedgerCommand::Show { json } => show(&ledger, json),
        LedgerCommand::Check => check(&ledger),
    }
}

fn show(ledger: &IdLedger, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(ledger).context("failed to serialize ledger")?
        );
        return Ok(());
    }

    if ledger.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }

    let mut rows: Vec<CodeRow> = ledger
        .mapping
        .iter()
        .map(|(key, code)| CodeRow {
            code: code.clone(),
            key: key.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let counters: Vec<String> = ledger
        .counters
        .iter()
        .map(|(bucket, n)| format!("{bucket}={n}"))
        .collect();
    println!("counters: {}", counters.join(" "));
    Ok(())
}

fn check(ledger: &IdLedger) -> Result<()> {
    let violations = ledger.verify();
    if violations.is_empty() {
        println!("✓ ledger consistent ({} codes)", ledger.len());
        return Ok(());
    }
    for violation in &violations {
        println!("{} {violation}", "✗".red().bold());
    }
    bail!("{} ledger violation(s)", violations.len())
}
