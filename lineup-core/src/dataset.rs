//! Dataset loading and normalization.
//!
//! Turns raw submission rows into deduplicated [`Speaker`]s and grouped
//! [`Session`]s. One row is one (speaker, session) pair; a speaker appears
//! once per session they submitted and a session once per co-speaker.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::classify::is_uuid_like;
use crate::error::{io_err, CoreError};
use crate::slug::{normalize, SlugAllocator};
use crate::types::{EntityKey, Session, Slug, Speaker, Submission};

/// Normalized view of one dataset, ready for reconciliation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub row_count: usize,
    /// Speakers in first-seen row order.
    pub speakers: Vec<Speaker>,
    /// Sessions in first-seen row order.
    pub sessions: Vec<Session>,
    /// Rows dropped for lacking a stable key, one message per row.
    pub rejected: Vec<String>,
    /// Non-fatal findings such as suspicious session ids.
    pub warnings: Vec<String>,
}

impl Dataset {
    pub fn session(&self, key: &EntityKey) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.key == key)
    }
}

/// Read the submission rows at `path` (a YAML or JSON list).
pub fn load_at(path: &Path) -> Result<Vec<Submission>, CoreError> {
    if !path.exists() {
        return Err(CoreError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Dataset {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Split a sponsor cell on `,` / `;` and slugify each name.
pub fn sponsor_slugs(raw: &str) -> Vec<Slug> {
    let mut slugs: Vec<Slug> = Vec::new();
    for name in raw.split([',', ';']) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let slug = Slug(normalize(name));
        if !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

/// Deduplicate speakers by email and group sessions by id.
///
/// - Rows without an email are dropped and listed in `rejected`.
/// - The first row of a speaker fixes their name and slug; later rows only
///   fill fields that are still empty.
/// - The first row of a session fixes its fields; later rows only add
///   co-speakers.
pub fn normalize_rows(rows: &[Submission]) -> Dataset {
    let mut dataset = Dataset {
        row_count: rows.len(),
        ..Dataset::default()
    };
    let mut slugs = SlugAllocator::new();
    let mut speaker_index: HashMap<String, usize> = HashMap::new();
    let mut session_index: HashMap<String, usize> = HashMap::new();

    for (row_no, row) in rows.iter().enumerate() {
        let Some(email) = row.email.as_deref() else {
            tracing::warn!("row {}: missing email address, skipping", row_no + 1);
            dataset
                .rejected
                .push(format!("row {}: missing email address", row_no + 1));
            continue;
        };

        let speaker_pos = match speaker_index.get(email) {
            Some(pos) => {
                let speaker = &mut dataset.speakers[*pos];
                fill_if_empty(&mut speaker.headline, &row.headline);
                fill_if_empty(&mut speaker.bio, &row.bio);
                fill_if_empty(&mut speaker.linkedin, &row.linkedin);
                fill_if_empty(&mut speaker.photo_url, &row.photo_url);
                *pos
            }
            None => {
                let name = row.speaker_name.clone().unwrap_or_default();
                let slug = slugs.allocate(&name);
                dataset.speakers.push(Speaker {
                    key: EntityKey::from(email),
                    name,
                    slug,
                    headline: cell(&row.headline),
                    bio: cell(&row.bio),
                    linkedin: cell(&row.linkedin),
                    photo_url: cell(&row.photo_url),
                    session_keys: Vec::new(),
                });
                speaker_index.insert(email.to_string(), dataset.speakers.len() - 1);
                dataset.speakers.len() - 1
            }
        };

        let Some(session_id) = row.session_id.as_deref() else {
            continue;
        };
        let session_key = EntityKey::from(session_id);
        let speaker_slug = dataset.speakers[speaker_pos].slug.clone();
        {
            let speaker = &mut dataset.speakers[speaker_pos];
            if !speaker.session_keys.contains(&session_key) {
                speaker.session_keys.push(session_key.clone());
            }
        }

        match session_index.get(session_id) {
            Some(pos) => {
                let session = &mut dataset.sessions[*pos];
                if !session.speaker_slugs.contains(&speaker_slug) {
                    session.speaker_slugs.push(speaker_slug);
                }
            }
            None => {
                if !is_uuid_like(session_id) {
                    tracing::warn!("invalid session ID format: {session_id}");
                    dataset
                        .warnings
                        .push(format!("invalid session ID format: {session_id}"));
                }
                dataset.sessions.push(Session {
                    key: session_key,
                    title: cell(&row.title),
                    abstract_text: cell(&row.abstract_text),
                    duration: cell(&row.duration),
                    level: cell(&row.level),
                    room: cell(&row.room),
                    agenda: cell(&row.agenda),
                    speaker_slugs: vec![speaker_slug],
                    sponsor_slugs: sponsor_slugs(&cell(&row.sponsors)),
                });
                session_index.insert(session_id.to_string(), dataset.sessions.len() - 1);
            }
        }
    }

    tracing::info!(
        "normalized {} rows into {} speakers and {} sessions",
        dataset.row_count,
        dataset.speakers.len(),
        dataset.sessions.len()
    );
    dataset
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn fill_if_empty(target: &mut String, value: &Option<String>) {
    if target.is_empty() {
        if let Some(v) = value {
            target.clone_from(v);
        }
    }
}
