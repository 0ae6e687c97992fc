//! Dry-run unified diff support for `lineup diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use lineup_core::classify::level_bucket;
use lineup_renderer::schema::diff_content;
use lineup_renderer::ArtifactKind;

use crate::allocator::Reservations;
use crate::pipeline::Project;
use crate::writer::read_existing;
use crate::SyncError;

/// One artifact that a run would write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    /// Fields that differ; empty for a new file.
    pub fields: Vec<&'static str>,
    pub unified_diff: String,
}

/// Render what `generate` would write and compare it to current on-disk
/// content. Artifacts the reconciler would skip produce no entry.
///
/// Nothing is written and the ledger is not saved.
pub fn diff_at(root: &Path) -> Result<Vec<FileDiff>, SyncError> {
    let project = Project::load_at(root)?;
    let Project {
        config,
        paths,
        dataset,
        ledger,
        renderer,
    } = &project;

    let mut planned: Vec<(PathBuf, ArtifactKind, String)> = Vec::new();
    for speaker in dataset.speakers.iter().filter(|s| s.has_sessions()) {
        planned.push((
            paths.speaker_profile(&speaker.slug.0),
            ArtifactKind::SpeakerProfile,
            renderer.render_speaker(speaker)?,
        ));
    }

    let mut reservations = Reservations::new(config.code_prefix.clone());
    let codes = reservations.reserve(
        ledger,
        dataset
            .sessions
            .iter()
            .map(|s| (&s.key, level_bucket(&s.level))),
    );
    for session in &dataset.sessions {
        if let Some(code) = codes.get(&session.key) {
            planned.push((
                paths.session_page(code),
                ArtifactKind::SessionPage,
                renderer.render_session(session, code, config.event_date)?,
            ));
        }
    }

    let mut diffs = Vec::new();
    for (path, kind, rendered) in planned {
        let existing = read_existing(&path)?;
        let fields = match &existing {
            Some(existing) => {
                let fields = diff_content(kind.schema(), &rendered, existing);
                if fields.is_empty() {
                    continue;
                }
                fields
            }
            None => Vec::new(),
        };
        let existing = existing.unwrap_or_default();

        let relative = path.strip_prefix(&paths.output_dir).unwrap_or(path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path,
            kind,
            fields,
            unified_diff: unified,
        });
    }
    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{run_at, RunOptions};

    const ROWS: &str = r#"
- Email Address: ada@example.com
  Speaker Name: Ada Lovelace
  Session_ID: S1
  Title of Session: Engines
  Session Level: "200"
"#;

    fn project_root() -> TempDir {
        let tmp = TempDir::new().expect("root");
        fs::create_dir_all(tmp.path().join("data")).expect("mkdir");
        fs::write(tmp.path().join("data/submissions.yaml"), ROWS).expect("rows");
        tmp
    }

    #[test]
    fn fresh_project_diffs_every_artifact() {
        let root = project_root();
        let diffs = diff_at(root.path()).expect("diff");
        assert_eq!(diffs.len(), 2);
        assert!(diffs.iter().all(|d| d.fields.is_empty()));
        assert!(!root.path().join("generated_files").exists());
        assert!(!root.path().join("data/session_id_mapping.json").exists());
    }

    #[test]
    fn no_diffs_after_clean_run() {
        let root = project_root();
        run_at(root.path(), RunOptions::default()).expect("run");
        let diffs = diff_at(root.path()).expect("diff");
        assert!(diffs.is_empty(), "generated project should have no diff");
    }

    #[test]
    fn local_edit_produces_unified_diff() {
        let root = project_root();
        run_at(root.path(), RunOptions::default()).expect("run");

        let target = root.path().join("generated_files/content/sessions/B201.md");
        let edited = fs::read_to_string(&target)
            .expect("read")
            .replace("Engines", "Engines (draft)");
        fs::write(&target, edited).expect("write");

        let diffs = diff_at(root.path()).expect("diff");
        assert_eq!(diffs.len(), 1);
        let diff = &diffs[0];
        assert_eq!(diff.kind, ArtifactKind::SessionPage);
        assert_eq!(diff.fields, vec!["title"]);
        assert!(diff.unified_diff.contains("--- a/content/sessions/B201.md"));
        assert!(diff.unified_diff.contains("+++ b/content/sessions/B201.md"));
        assert!(diff.unified_diff.contains("@@"));
    }
}
