//! Orphan removal.
//!
//! Session pages are swept by ledger: every mapped key absent from the
//! dataset loses its page, but keeps its mapping and counter so a returning
//! key gets its old code back. Speaker profiles have no ledger entry and are
//! swept by listing the speakers directory against the live slugs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use lineup_core::config::ProjectPaths;
use lineup_core::ledger::IdLedger;
use lineup_core::types::{EntityKey, ShortCode, Slug};

use crate::error::{io_err, SyncError};
use crate::report::{Failure, FailureKind};
use crate::writer::remove_file;

/// Directory under the speakers tree that is never swept.
pub const SECTION_INDEX: &str = "_index";

/// What a sweep removed, or would remove in a dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Short codes or slugs of removed artifacts.
    pub removed: Vec<String>,
    pub failures: Vec<Failure>,
}

impl Sweep {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Remove session pages of ledger keys not in `live`. The ledger is not
/// modified.
pub fn sweep_sessions(
    ledger: &IdLedger,
    live: &BTreeSet<&EntityKey>,
    paths: &ProjectPaths,
    dry_run: bool,
) -> Sweep {
    let mut sweep = Sweep::default();
    for (key, code) in &ledger.mapping {
        if live.contains(key) {
            continue;
        }
        if code.parse::<ShortCode>().is_err() {
            tracing::warn!("orphan {key} has malformed code '{code}', leaving it alone");
            continue;
        }
        let path = paths.session_page(code);
        if dry_run {
            if path.exists() {
                tracing::info!("[dry-run] would remove: {}", path.display());
                sweep.removed.push(code.clone());
            }
            continue;
        }
        match remove_file(&path) {
            Ok(true) => sweep.removed.push(code.clone()),
            Ok(false) => {}
            Err(e) => sweep.failures.push(Failure {
                key: key.to_string(),
                kind: FailureKind::Write,
                message: e.to_string(),
            }),
        }
    }
    sweep
}

/// Remove speaker profile directories whose slug is not in `valid`.
///
/// Only directories holding an `index.md` are profiles; anything else under
/// the speakers tree is left in place, as is [`SECTION_INDEX`].
pub fn sweep_speakers(paths: &ProjectPaths, valid: &BTreeSet<&Slug>, dry_run: bool) -> Sweep {
    let mut sweep = Sweep::default();
    let dir = paths.speakers_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return sweep,
        Err(e) => {
            sweep.failures.push(speaker_failure(&dir, io_err(&dir, e)));
            return sweep;
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        if !path.is_dir() || name == SECTION_INDEX || !path.join("index.md").is_file() {
            continue;
        }
        if valid.contains(&Slug::from(name.as_str())) {
            continue;
        }
        candidates.push((name, path));
    }
    candidates.sort();

    for (slug, path) in candidates {
        if dry_run {
            tracing::info!("[dry-run] would remove: {}", path.display());
            sweep.removed.push(slug);
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                tracing::info!("removed speaker profile: {slug}");
                sweep.removed.push(slug);
            }
            Err(e) => sweep.failures.push(speaker_failure(&path, io_err(&path, e))),
        }
    }
    sweep
}

fn speaker_failure(path: &Path, err: SyncError) -> Failure {
    Failure {
        key: path.display().to_string(),
        kind: FailureKind::Write,
        message: err.to_string(),
    }
}
