//! `lineup generate`: reconcile the generated tree with the dataset.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use lineup_core::classify::level_name;
use lineup_sync::{run_at, CategoryStats, DatasetSummary, RunOptions, RunReport};

/// Arguments for `lineup generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Rewrite every page without comparing against what is on disk.
    #[arg(long)]
    pub force: bool,

    /// Report what would change without writing, deleting or saving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let options = RunOptions {
            force: self.force,
            dry_run: self.dry_run,
        };
        let report = run_at(root, options)
            .with_context(|| format!("generate failed for {}", root.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
        } else {
            print_summary(&report);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "pages")]
    category: &'static str,
    created: usize,
    updated: usize,
    skipped: usize,
    failed: usize,
}

impl StatsRow {
    fn new(category: &'static str, stats: &CategoryStats) -> Self {
        Self {
            category,
            created: stats.created,
            updated: stats.updated,
            skipped: stats.skipped,
            failed: stats.failed,
        }
    }
}

fn print_summary(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let started = report.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");

    if report.is_noop() && !report.has_failures() {
        println!("{prefix}✓ nothing to do (run started {started})");
    } else {
        println!("{prefix}✓ run started {started}");
    }

    let mut table = Table::new([
        StatsRow::new("speakers", &report.speakers),
        StatsRow::new("sessions", &report.sessions),
    ]);
    table.with(Style::rounded());
    println!("{table}");

    if !report.removed_sessions.is_empty() {
        println!(
            "{prefix}removed sessions: {}",
            report.removed_sessions.join(", ")
        );
    }
    if !report.removed_speakers.is_empty() {
        println!(
            "{prefix}removed speakers: {}",
            report.removed_speakers.join(", ")
        );
    }

    print_dataset_summary(&report.summary);

    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
    for failure in &report.failures {
        println!(
            "{} {} ({:?}): {}",
            "failed:".red().bold(),
            failure.key,
            failure.kind,
            failure.message
        );
    }
}

fn print_dataset_summary(summary: &DatasetSummary) {
    println!(
        "dataset: {} speaker(s), {} session(s)",
        summary.speakers, summary.sessions
    );
    if summary.multi_speaker_sessions > 0 {
        println!(
            "  sessions with multiple speakers: {}",
            summary.multi_speaker_sessions
        );
    }
    if summary.sessions_by_level.is_empty() {
        return;
    }
    println!("sessions by level:");
    for (bucket, count) in &summary.sessions_by_level {
        println!("  level {bucket} ({}): {count}", level_name(*bucket));
    }
}
