//! Template contexts: serializable rendering payloads built from entities.
//!
//! Scalar values arrive pre-quoted and multi-line fields arrive as complete
//! blocks, so templates only arrange lines and cannot drift from the
//! formatting rules in [`crate::format`].

use chrono::NaiveDate;
use serde::Serialize;

use lineup_core::classify::session_datetime;
use lineup_core::types::{Session, Speaker};

use crate::error::RenderError;
use crate::format::{body_text, duration_block, linkedin_line, list_block, quote};

/// Payload for `speaker/index.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerContext {
    pub slug: String,
    pub title: String,
    pub headline: String,
    /// Full `linkedin:` line, or its disabled placeholder.
    pub linkedin: String,
    pub bio: String,
}

impl SpeakerContext {
    pub fn from_speaker(speaker: &Speaker) -> Self {
        Self {
            slug: speaker.slug.0.clone(),
            title: quote(&speaker.name),
            headline: quote(&speaker.headline),
            linkedin: linkedin_line(&speaker.linkedin),
            bio: body_text(&speaker.bio),
        }
    }
}

/// Payload for `session/page.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub code: String,
    pub id: String,
    pub title: String,
    pub date: String,
    /// `speakers:` block list.
    pub speakers: String,
    pub room: String,
    pub agenda: String,
    /// `sponsors:` block list; empty when the session has no sponsors.
    pub sponsors: String,
    /// Active `duration:` line or a block of commented alternatives.
    pub duration: String,
    pub abstract_text: String,
}

impl SessionContext {
    pub fn from_session(session: &Session, code: &str, event_date: NaiveDate) -> Self {
        let speakers: Vec<String> = session.speaker_slugs.iter().map(|s| s.0.clone()).collect();
        let sponsors: Vec<String> = session.sponsor_slugs.iter().map(|s| s.0.clone()).collect();
        let date = session_datetime(event_date, &session.agenda).unwrap_or_default();

        Self {
            code: code.to_string(),
            id: quote(&session.key.0),
            title: quote(&session.title),
            date: quote(&date),
            speakers: list_block("speakers", &speakers),
            room: quote(&session.room),
            agenda: quote(&session.agenda),
            sponsors: if sponsors.is_empty() {
                String::new()
            } else {
                list_block("sponsors", &sponsors)
            },
            duration: duration_block(&session.duration),
            abstract_text: body_text(&session.abstract_text),
        }
    }
}

/// Convert any context to a [`tera::Context`].
pub fn to_tera_context<T: Serialize>(ctx: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(ctx).map_err(RenderError::from)
}
