//! Lineup core library: domain types, identifier ledger, slugs, dataset
//! normalization, and project configuration.
//!
//! - [`types`]: newtypes and entity structs
//! - [`error`]: [`CoreError`]
//! - [`slug`]: per-run [`SlugAllocator`]
//! - [`ledger`]: persisted key → short-code [`IdLedger`]
//! - [`dataset`]: submission rows → speakers and sessions
//! - [`classify`]: level buckets, duration and datetime normalization
//! - [`config`]: `lineup.yaml` and resolved [`ProjectPaths`]

pub mod classify;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ledger;
pub mod slug;
pub mod types;

pub use config::{Config, ProjectPaths};
pub use dataset::Dataset;
pub use error::CoreError;
pub use ledger::{IdLedger, LedgerViolation};
pub use slug::SlugAllocator;
pub use types::{Bucket, EntityKey, Session, ShortCode, Slug, Speaker, Submission};
