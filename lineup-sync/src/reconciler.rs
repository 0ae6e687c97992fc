//! Per-artifact reconciliation: decide between create, update and skip.
//!
//! The candidate content and the file on disk are both parsed with the same
//! front-matter parser and compared field by field under the artifact's
//! schema, so formatting noise and list reordering never cause a rewrite.

use std::path::Path;

use serde::Serialize;

use lineup_renderer::schema::{diff_content, FieldSpec};

use crate::error::SyncError;
use crate::writer::{atomic_write, read_existing_bytes};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    /// Rewrite every artifact without comparing.
    pub force: bool,
    /// Classify only; write, delete and save nothing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    Skipped,
}

/// Bring the artifact at `path` in line with `candidate`.
///
/// An `Err` means nothing was written; the caller records it as a write
/// failure for this entity and moves on.
pub fn reconcile(
    path: &Path,
    candidate: &str,
    schema: &[FieldSpec],
    options: RunOptions,
) -> Result<Outcome, SyncError> {
    let outcome = if options.force {
        if path.exists() {
            Outcome::Updated
        } else {
            Outcome::Created
        }
    } else {
        match read_existing_bytes(path)? {
            None => Outcome::Created,
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(existing) => {
                    let existing = existing.replace("\r\n", "\n");
                    let changed = diff_content(schema, candidate, &existing);
                    if changed.is_empty() {
                        tracing::debug!("unchanged: {}", path.display());
                        return Ok(Outcome::Skipped);
                    }
                    tracing::debug!("{} differs in: {}", path.display(), changed.join(", "));
                    Outcome::Updated
                }
                Err(_) => {
                    tracing::warn!("{} is not valid UTF-8, rewriting", path.display());
                    Outcome::Updated
                }
            },
        }
    };

    if options.dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
    } else {
        atomic_write(path, candidate)?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_renderer::schema::{SESSION_FIELDS, SPEAKER_FIELDS};
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = "---\nid: \"S1\"\nspeakers:\n    - \"ada\"\n    - \"bob\"\n---\n\nAbstract.\n";
    const REORDERED: &str =
        "---\nid: \"S1\"\nspeakers:\n    - \"bob\"\n    - \"ada\"\n---\n\nAbstract.\n";

    fn normal() -> RunOptions {
        RunOptions::default()
    }

    #[test]
    fn missing_artifact_is_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sessions").join("B201.md");
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, normal()).unwrap();
        assert_eq!(outcome, Outcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), PAGE);
    }

    #[test]
    fn reordered_list_is_skipped_and_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        fs::write(&path, REORDERED).unwrap();
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, normal()).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), REORDERED);
    }

    #[test]
    fn changed_field_is_updated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.md");
        fs::write(&path, "---\ntitle: \"Ada\"\nheadline: \"Old\"\n---\n\nBio.\n").unwrap();
        let candidate = "---\ntitle: \"Ada\"\nheadline: \"New\"\n---\n\nBio.\n";
        let outcome = reconcile(&path, candidate, SPEAKER_FIELDS, normal()).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), candidate);
    }

    #[test]
    fn force_rewrites_identical_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        fs::write(&path, REORDERED).unwrap();
        let options = RunOptions {
            force: true,
            ..normal()
        };
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, options).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), PAGE);
    }

    #[test]
    fn non_utf8_artifact_is_updated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        fs::write(&path, b"---\ntitle: \"caf\xe9\"\n---\n").unwrap();
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, normal()).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), PAGE);
    }

    #[test]
    fn force_overwrites_non_utf8_artifact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        fs::write(&path, b"---\ntitle: \"caf\xe9\"\n---\n").unwrap();
        let options = RunOptions {
            force: true,
            ..normal()
        };
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, options).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), PAGE);
    }

    #[test]
    fn force_on_missing_artifact_is_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        let options = RunOptions {
            force: true,
            ..normal()
        };
        assert_eq!(
            reconcile(&path, PAGE, SESSION_FIELDS, options).unwrap(),
            Outcome::Created
        );
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("B201.md");
        let options = RunOptions {
            dry_run: true,
            ..normal()
        };
        let outcome = reconcile(&path, PAGE, SESSION_FIELDS, options).unwrap();
        assert_eq!(outcome, Outcome::Created);
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sessions"), "blocking file").unwrap();
        let path = tmp.path().join("sessions").join("B201.md");
        assert!(reconcile(&path, PAGE, SESSION_FIELDS, normal()).is_err());
    }
}
