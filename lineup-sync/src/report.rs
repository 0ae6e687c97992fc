//! Side-report of a run: per-category counts, removals, failures and a
//! summary of the dataset behind it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lineup_core::classify::{duration_options, level_bucket};
use lineup_core::dataset::Dataset;
use lineup_core::types::Bucket;

use crate::reconciler::Outcome;

/// Created/updated/skipped/failed counts for one artifact category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CategoryStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Artifacts written (or that would be written in a dry run).
    pub fn changed(&self) -> usize {
        self.created + self.updated
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source record without a stable key; dropped.
    Validation,
    /// Content could not be produced; artifact untouched.
    Render,
    /// Filesystem error on write or removal; reservation not committed.
    Write,
}

/// One isolated per-entity failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub key: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Counts over the dataset itself, independent of what the run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    /// Unique speakers, published or not.
    pub speakers: usize,
    pub sessions: usize,
    pub sessions_by_level: BTreeMap<Bucket, usize>,
    pub multi_speaker_sessions: usize,
    /// Published speakers whose profile carries the LinkedIn placeholder.
    pub speakers_missing_linkedin: usize,
    /// Sessions rendered with commented-out duration alternatives.
    pub sessions_with_duration_options: usize,
    pub speakers_without_sessions: usize,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut summary = DatasetSummary {
            speakers: dataset.speakers.len(),
            sessions: dataset.sessions.len(),
            ..DatasetSummary::default()
        };
        for session in &dataset.sessions {
            *summary
                .sessions_by_level
                .entry(level_bucket(&session.level))
                .or_default() += 1;
            if session.speaker_slugs.len() > 1 {
                summary.multi_speaker_sessions += 1;
            }
            if duration_options(&session.duration).len() > 1 {
                summary.sessions_with_duration_options += 1;
            }
        }
        for speaker in &dataset.speakers {
            if !speaker.has_sessions() {
                summary.speakers_without_sessions += 1;
            } else if speaker.linkedin.is_empty() {
                summary.speakers_missing_linkedin += 1;
            }
        }
        summary
    }

    /// Human-readable warnings for the counts worth a second look.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.speakers_missing_linkedin > 0 {
            warnings.push(format!(
                "{} speaker(s) missing LinkedIn profiles",
                self.speakers_missing_linkedin
            ));
        }
        if self.sessions_with_duration_options > 0 {
            warnings.push(format!(
                "{} session(s) with multiple durations (commented out)",
                self.sessions_with_duration_options
            ));
        }
        if self.speakers_without_sessions > 0 {
            warnings.push(format!(
                "{} speaker(s) without session data",
                self.speakers_without_sessions
            ));
        }
        warnings
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub speakers: CategoryStats,
    pub sessions: CategoryStats,
    /// Short codes whose session pages were removed.
    pub removed_sessions: Vec<String>,
    /// Slugs whose profile directories were removed.
    pub removed_speakers: Vec<String>,
    pub failures: Vec<Failure>,
    pub warnings: Vec<String>,
    pub summary: DatasetSummary,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            speakers: CategoryStats::default(),
            sessions: CategoryStats::default(),
            removed_sessions: Vec::new(),
            removed_speakers: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            summary: DatasetSummary::default(),
        }
    }

    pub(crate) fn fail(
        &mut self,
        key: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) {
        let failure = Failure {
            key: key.into(),
            kind,
            message: message.into(),
        };
        tracing::warn!("{:?} failure for {}: {}", failure.kind, failure.key, failure.message);
        self.failures.push(failure);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when the run wrote or removed nothing.
    pub fn is_noop(&self) -> bool {
        self.speakers.changed() == 0
            && self.sessions.changed() == 0
            && self.removed_sessions.is_empty()
            && self.removed_speakers.is_empty()
    }
}
