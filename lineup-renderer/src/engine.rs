//! Tera rendering engine: [`ArtifactKind`] and [`Renderer`].
//!
//! # Template mapping
//!
//! | Artifact        | Template                | Output path                                  |
//! |-----------------|-------------------------|----------------------------------------------|
//! | SpeakerProfile  | `speaker/index.md.tera` | `<output>/content/speakers/<slug>/index.md`  |
//! | SessionPage     | `session/page.md.tera`  | `<output>/content/sessions/<code>.md`        |

use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tera::Tera;

use lineup_core::types::{Session, Speaker};

use crate::context::{to_tera_context, SessionContext, SpeakerContext};
use crate::error::RenderError;
use crate::schema::{FieldSpec, SESSION_FIELDS, SPEAKER_FIELDS};

// ---------------------------------------------------------------------------
// Template sources
// ---------------------------------------------------------------------------

const SPEAKER_TEMPLATE: &str = include_str!("templates/speaker.md.tera");
const SESSION_TEMPLATE: &str = include_str!("templates/session.md.tera");

/// Source for `kind`: `<overrides>/<template name>` when that file exists,
/// the embedded default otherwise.
fn template_source(kind: ArtifactKind, overrides: Option<&Path>) -> Result<String, RenderError> {
    if let Some(path) = overrides.map(|dir| dir.join(kind.template_name())) {
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!("{} template overridden by {}", kind.label(), path.display());
                return Ok(source);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(RenderError::Io { path, source }),
        }
    }
    Ok(kind.embedded_template().to_string())
}

fn build_tera(overrides: Option<&Path>) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    for kind in ArtifactKind::all() {
        let source = template_source(*kind, overrides)?;
        tera.add_raw_template(kind.template_name(), &source)?;
    }
    Ok(tera)
}

/// LF line endings and exactly one trailing newline.
fn normalize_output(rendered: &str) -> String {
    let mut out = rendered.replace("\r\n", "\n").trim_end().to_string();
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The two artifact categories produced from a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    SpeakerProfile,
    SessionPage,
}

impl ArtifactKind {
    /// All kinds in reconciliation order.
    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::SpeakerProfile, ArtifactKind::SessionPage]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            ArtifactKind::SpeakerProfile => "speaker/index.md.tera",
            ArtifactKind::SessionPage => "session/page.md.tera",
        }
    }

    fn embedded_template(&self) -> &'static str {
        match self {
            ArtifactKind::SpeakerProfile => SPEAKER_TEMPLATE,
            ArtifactKind::SessionPage => SESSION_TEMPLATE,
        }
    }

    /// Fields compared to decide whether an existing artifact is stale.
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            ArtifactKind::SpeakerProfile => SPEAKER_FIELDS,
            ArtifactKind::SessionPage => SESSION_FIELDS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::SpeakerProfile => "speaker",
            ArtifactKind::SessionPage => "session",
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for the artifact templates.
///
/// An override directory may replace either template with a file at the
/// template's name, e.g. `<dir>/session/page.md.tera`. Other files there
/// are ignored.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(overrides: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(overrides)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `kind` with any serializable context.
    pub fn render<T: Serialize>(&self, kind: ArtifactKind, ctx: &T) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(ctx)?;
        let template = kind.template_name();
        let rendered = self
            .tera
            .render(template, &tera_ctx)
            .map_err(|source| RenderError::Template { template, source })?;
        Ok(normalize_output(&rendered))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders candidate artifact content from entities. Create once per run.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Renderer with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_templates(None)
    }

    /// Renderer with `.tera` overrides loaded from `dir`.
    pub fn with_templates(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(dir)?,
        })
    }

    pub fn render_speaker(&self, speaker: &Speaker) -> Result<String, RenderError> {
        let ctx = SpeakerContext::from_speaker(speaker);
        self.engine.render(ArtifactKind::SpeakerProfile, &ctx)
    }

    pub fn render_session(
        &self,
        session: &Session,
        code: &str,
        event_date: NaiveDate,
    ) -> Result<String, RenderError> {
        let ctx = SessionContext::from_session(session, code, event_date);
        self.engine.render(ArtifactKind::SessionPage, &ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
