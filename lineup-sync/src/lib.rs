//! # lineup-sync
//!
//! Incremental reconciliation of the generated site tree.
//!
//! Call [`run_at`] to bring every speaker profile and session page under a
//! project root in line with its dataset, or [`diff_at`] to see what such a
//! run would change. Short codes are allocated in two phases
//! ([`Reservations`]) so only successfully written pages consume a code.

pub mod allocator;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod report;
pub mod sweeper;
pub mod writer;

pub use allocator::Reservations;
pub use diff::{diff_at, FileDiff};
pub use error::SyncError;
pub use pipeline::{run_at, run_dataset, Project};
pub use reconciler::{reconcile, Outcome, RunOptions};
pub use report::{CategoryStats, DatasetSummary, Failure, FailureKind, RunReport};
pub use sweeper::{sweep_sessions, sweep_speakers, Sweep};
