//! Project configuration (`lineup.yaml`).
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   lineup.yaml                      (optional, defaults apply when absent)
//!   data/submissions.yaml            (dataset)
//!   data/session_id_mapping.json     (ledger)
//!   generated_files/content/...      (artifact tree)
//! ```
//!
//! Relative paths in the config are resolved against `<root>`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{io_err, CoreError};

pub const CONFIG_FILE: &str = "lineup.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub ledger: PathBuf,
    pub event_date: NaiveDate,
    /// Letters in front of every short code; ASCII letters only.
    #[serde(deserialize_with = "code_prefix")]
    pub code_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data").join("submissions.yaml"),
            output_dir: PathBuf::from("generated_files"),
            ledger: PathBuf::from("data").join("session_id_mapping.json"),
            event_date: NaiveDate::from_ymd_opt(2025, 9, 25).unwrap_or_default(),
            code_prefix: "B".to_string(),
            templates_dir: None,
        }
    }
}

fn code_prefix<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let prefix = String::deserialize(deserializer)?;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(serde::de::Error::custom(format!(
            "code_prefix must be one or more ASCII letters, got {prefix:?}"
        )));
    }
    Ok(prefix)
}

/// Load `<root>/lineup.yaml`, or defaults if it does not exist.
pub fn load_at(root: &Path) -> Result<Config, CoreError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Config { path, source: e })
}

/// Absolute paths derived from a [`Config`] and its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub ledger: PathBuf,
    pub templates_dir: Option<PathBuf>,
}

impl ProjectPaths {
    pub fn resolve(root: &Path, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            source: root.join(&config.source),
            output_dir: root.join(&config.output_dir),
            ledger: root.join(&config.ledger),
            templates_dir: config.templates_dir.as_ref().map(|d| root.join(d)),
        }
    }

    /// `<output>/content/speakers/`
    pub fn speakers_dir(&self) -> PathBuf {
        self.output_dir.join("content").join("speakers")
    }

    /// `<output>/content/sessions/`
    pub fn sessions_dir(&self) -> PathBuf {
        self.output_dir.join("content").join("sessions")
    }

    /// `<output>/content/speakers/<slug>/index.md`
    pub fn speaker_profile(&self, slug: &str) -> PathBuf {
        self.speakers_dir().join(slug).join("index.md")
    }

    /// `<output>/content/sessions/<code>.md`
    pub fn session_page(&self, code: &str) -> PathBuf {
        self.sessions_dir().join(format!("{code}.md"))
    }
}
