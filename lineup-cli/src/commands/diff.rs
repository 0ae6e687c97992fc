//! `lineup diff`: show unified diffs for what `generate` would write.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lineup_sync::diff_at;

/// Arguments for `lineup diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only list the pages that would change.
    #[arg(long)]
    pub name_only: bool,
}

impl DiffArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let diffs =
            diff_at(root).with_context(|| format!("diff failed for {}", root.display()))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            let change = if diff.fields.is_empty() {
                "new".to_string()
            } else {
                diff.fields.join(", ")
            };
            println!(
                "{} {} ({change})",
                diff.kind.label().bold(),
                diff.path.display()
            );
            if self.name_only {
                continue;
            }
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
