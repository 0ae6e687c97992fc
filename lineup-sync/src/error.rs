//! Error types for lineup-sync.
//!
//! Only run-level failures are errors. Failures of a single artifact are
//! recorded in the [`crate::report::RunReport`] and never abort a run.

use std::path::PathBuf;

use thiserror::Error;

use lineup_core::error::CoreError;
use lineup_renderer::RenderError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Template set could not be built.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Config, dataset or ledger failure. Always fatal.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Whether this failure concerns the ledger file.
    pub fn is_ledger_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Core(
                CoreError::LedgerIo { .. }
                    | CoreError::LedgerParse { .. }
                    | CoreError::LedgerSerialize(_)
            )
        )
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
