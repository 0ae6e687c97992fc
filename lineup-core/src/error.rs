//! Error types for lineup-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from ledger, dataset, and config operations.
///
/// Every `Ledger*` variant is fatal for a run: identifier stability cannot
/// be guaranteed without a readable and writable ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The ledger file exists but could not be read, or could not be written.
    #[error("ledger I/O error at {path}: {source}")]
    LedgerIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger file is not valid JSON or has an unexpected shape.
    #[error("failed to parse ledger at {path}: {source}")]
    LedgerParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the ledger failed (save path).
    #[error("ledger serialization error: {0}")]
    LedgerSerialize(#[from] serde_json::Error),

    /// A mapped short code does not follow `<prefix><bucket><seq>`.
    #[error("invalid short code '{code}'")]
    InvalidShortCode { code: String },

    /// Generic filesystem failure outside the ledger (dataset, config).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file could not be parsed.
    #[error("failed to parse dataset at {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `lineup.yaml` exists but is malformed.
    #[error("failed to parse config at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The dataset file named by the config does not exist.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`CoreError::LedgerIo`].
pub(crate) fn ledger_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::LedgerIo {
        path: path.into(),
        source,
    }
}
