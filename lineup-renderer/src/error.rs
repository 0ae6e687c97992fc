//! Error types for lineup-renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Template parsing or context conversion failed.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// A specific template could not produce output.
    #[error("failed to render {template}: {source}")]
    Template {
        template: &'static str,
        source: tera::Error,
    },

    /// Filesystem error while loading template overrides.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}
