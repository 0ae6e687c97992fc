//! Run pipeline shared by `lineup generate` and `lineup diff`.
//!
//! ```text
//! load config ─> load dataset ─> load ledger (fatal on error)
//!   ─> reserve session codes
//!   ─> reconcile speaker profiles
//!   ─> reconcile session pages, committing each success
//!   ─> sweep orphans
//!   ─> save ledger once
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lineup_core::classify::level_bucket;
use lineup_core::config::{self, Config, ProjectPaths};
use lineup_core::dataset::{self, Dataset};
use lineup_core::ledger::{self, IdLedger};
use lineup_core::types::{EntityKey, Session, Slug};
use lineup_renderer::{ArtifactKind, Renderer};

use crate::allocator::Reservations;
use crate::error::SyncError;
use crate::reconciler::{reconcile, RunOptions};
use crate::report::{DatasetSummary, FailureKind, RunReport};
use crate::sweeper::{sweep_sessions, sweep_speakers};

/// Everything a run needs, loaded from a project root.
pub struct Project {
    pub config: Config,
    pub paths: ProjectPaths,
    pub dataset: Dataset,
    pub ledger: IdLedger,
    pub renderer: Renderer,
}

impl Project {
    /// Load config, dataset, ledger and templates for `root`.
    pub fn load_at(root: &Path) -> Result<Self, SyncError> {
        let config = config::load_at(root)?;
        let paths = ProjectPaths::resolve(root, &config);
        let rows = dataset::load_at(&paths.source)?;
        let dataset = dataset::normalize_rows(&rows);
        let ledger = ledger::load_at(&paths.ledger)?;
        let renderer = Renderer::with_templates(paths.templates_dir.as_deref())?;
        Ok(Self {
            config,
            paths,
            dataset,
            ledger,
            renderer,
        })
    }
}

/// Run a full reconciliation for the project at `root` and persist the
/// ledger (unless `dry_run`).
pub fn run_at(root: &Path, options: RunOptions) -> Result<RunReport, SyncError> {
    let mut project = Project::load_at(root)?;
    let report = run_dataset(&mut project, options);
    if !options.dry_run {
        ledger::save_at(&project.paths.ledger, &project.ledger)?;
    }
    tracing::info!(
        "run finished: speakers {:?}, sessions {:?}, {} failure(s)",
        report.speakers,
        report.sessions,
        report.failures.len()
    );
    Ok(report)
}

/// Reconcile every entity of `project.dataset` against the artifact tree.
///
/// Mutates `project.ledger` in memory only; the caller decides whether to
/// save it. Per-entity failures land in the report.
pub fn run_dataset(project: &mut Project, options: RunOptions) -> RunReport {
    let mut report = RunReport::new(options.dry_run);
    let Project {
        config,
        paths,
        dataset,
        ledger,
        renderer,
    } = project;

    for rejected in &dataset.rejected {
        report.fail(rejected.clone(), FailureKind::Validation, "record dropped");
    }
    report.summary = DatasetSummary::from_dataset(dataset);
    report.warnings.extend(report.summary.warnings());
    report.warnings.extend(dataset.warnings.iter().cloned());

    let mut sessions: Vec<&Session> = dataset.sessions.iter().collect();
    sessions.sort_by(|a, b| a.key.cmp(&b.key));

    let mut reservations = Reservations::new(config.code_prefix.clone());
    let codes: BTreeMap<EntityKey, String> = reservations.reserve(
        ledger,
        sessions.iter().map(|s| (&s.key, level_bucket(&s.level))),
    );

    reconcile_speakers(dataset, paths, renderer, options, &mut report);

    for session in &sessions {
        let Some(code) = codes.get(&session.key) else {
            continue;
        };
        let candidate = match renderer.render_session(session, code, config.event_date) {
            Ok(candidate) => candidate,
            Err(e) => {
                report.sessions.failed += 1;
                report.fail(session.key.to_string(), FailureKind::Render, e.to_string());
                continue;
            }
        };
        let path = paths.session_page(code);
        match reconcile(&path, &candidate, ArtifactKind::SessionPage.schema(), options) {
            Ok(outcome) => {
                report.sessions.record(outcome);
                if !options.dry_run {
                    reservations.commit(ledger, &session.key);
                }
            }
            Err(e) => {
                report.sessions.failed += 1;
                report.fail(session.key.to_string(), FailureKind::Write, e.to_string());
            }
        }
    }
    if reservations.pending() > 0 && !options.dry_run {
        tracing::warn!(
            "{} reservation(s) not committed; their codes stay free",
            reservations.pending()
        );
    }

    let live: BTreeSet<&EntityKey> = dataset.sessions.iter().map(|s| &s.key).collect();
    let swept = sweep_sessions(ledger, &live, paths, options.dry_run);
    report.removed_sessions = swept.removed;
    report.failures.extend(swept.failures);

    let valid: BTreeSet<&Slug> = dataset
        .speakers
        .iter()
        .filter(|s| s.has_sessions())
        .map(|s| &s.slug)
        .collect();
    let swept = sweep_speakers(paths, &valid, options.dry_run);
    report.removed_speakers = swept.removed;
    report.failures.extend(swept.failures);

    report
}

fn reconcile_speakers(
    dataset: &Dataset,
    paths: &ProjectPaths,
    renderer: &Renderer,
    options: RunOptions,
    report: &mut RunReport,
) {
    for speaker in dataset.speakers.iter().filter(|s| s.has_sessions()) {
        let candidate = match renderer.render_speaker(speaker) {
            Ok(candidate) => candidate,
            Err(e) => {
                report.speakers.failed += 1;
                report.fail(speaker.key.to_string(), FailureKind::Render, e.to_string());
                continue;
            }
        };
        let path = paths.speaker_profile(&speaker.slug.0);
        match reconcile(&path, &candidate, ArtifactKind::SpeakerProfile.schema(), options) {
            Ok(outcome) => report.speakers.record(outcome),
            Err(e) => {
                report.speakers.failed += 1;
                report.fail(speaker.key.to_string(), FailureKind::Write, e.to_string());
            }
        }
    }
}
