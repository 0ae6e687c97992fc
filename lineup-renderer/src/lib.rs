//! # lineup-renderer
//!
//! Renders speaker profiles and session pages from normalized dataset
//! entities, and parses rendered artifacts back into comparable fields.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lineup_renderer::{schema, Renderer};
//! use lineup_core::types::Speaker;
//!
//! fn is_stale(speaker: &Speaker, on_disk: &str) -> bool {
//!     match Renderer::new().and_then(|r| r.render_speaker(speaker)) {
//!         Ok(candidate) => !schema::diff_content(schema::SPEAKER_FIELDS, &candidate, on_disk).is_empty(),
//!         Err(_) => false,
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod schema;

pub use context::{SessionContext, SpeakerContext};
pub use engine::{ArtifactKind, Renderer, TemplateEngine};
pub use error::RenderError;
pub use frontmatter::{Document, FieldValue};
