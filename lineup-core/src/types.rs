//! Domain types for the lineup generator.
//!
//! Two kinds of entity own an on-disk artifact:
//! - [`Speaker`]: a *named* entity, addressed on disk by its [`Slug`].
//! - [`Session`]: a *sequence-coded* entity, addressed on disk by the
//!   [`ShortCode`] the ledger allocated for its [`EntityKey`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable external key of an entity (speaker email, session id). Opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub String);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Filesystem-safe, human-readable identifier of a named entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(pub String);

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Coarse classification partitioning short-code numbering (session level).
///
/// Serialized transparently so ledger counters read `{"2": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket(pub u8);

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// ShortCode
// ---------------------------------------------------------------------------

/// Bucket-tagged, zero-padded sequence identifier, e.g. `B201`.
///
/// Layout: `<prefix><bucket digit><sequence, at least two digits>`. The
/// prefix plus bucket digit form the fixed two-character bucket tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode {
    pub prefix: String,
    pub bucket: Bucket,
    pub number: u32,
}

impl ShortCode {
    pub fn new(prefix: impl Into<String>, bucket: Bucket, number: u32) -> Self {
        Self {
            prefix: prefix.into(),
            bucket,
            number,
        }
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:02}", self.prefix, self.bucket, self.number)
    }
}

impl FromStr for ShortCode {
    type Err = CoreError;

    /// Parses any alphabetic prefix, a single bucket digit, then the sequence.
    /// A trailing `.md` (as written by older ledgers) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidShortCode { code: s.to_owned() };
        let code = s.strip_suffix(".md").unwrap_or(s);
        let split = code
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (prefix, digits) = code.split_at(split);
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let bucket: u8 = digits[..1].parse().map_err(|_| invalid())?;
        let number: u32 = digits[1..].parse().map_err(|_| invalid())?;
        Ok(ShortCode::new(prefix, Bucket(bucket), number))
    }
}

// ---------------------------------------------------------------------------
// Source rows
// ---------------------------------------------------------------------------

/// A single raw row of the submissions dataset.
///
/// Field aliases accept the column headers of the spreadsheet export.
/// Every cell is optional; blank cells and `nan` are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Submission {
    #[serde(default, alias = "Email Address", deserialize_with = "lenient_cell")]
    pub email: Option<String>,
    #[serde(default, alias = "Speaker Name", deserialize_with = "lenient_cell")]
    pub speaker_name: Option<String>,
    #[serde(default, alias = "Speaker Headline", deserialize_with = "lenient_cell")]
    pub headline: Option<String>,
    #[serde(default, alias = "Bio", deserialize_with = "lenient_cell")]
    pub bio: Option<String>,
    #[serde(
        default,
        alias = "Link to your LinkedIn profile",
        deserialize_with = "lenient_cell"
    )]
    pub linkedin: Option<String>,
    #[serde(
        default,
        alias = "Link to photo (Optional, defaults to LinkedIn Profile)",
        deserialize_with = "lenient_cell"
    )]
    pub photo_url: Option<String>,
    #[serde(default, alias = "Session_ID", deserialize_with = "lenient_cell")]
    pub session_id: Option<String>,
    #[serde(default, alias = "Title of Session", deserialize_with = "lenient_cell")]
    pub title: Option<String>,
    #[serde(default, alias = "Abstract of Session", deserialize_with = "lenient_cell")]
    pub abstract_text: Option<String>,
    #[serde(default, alias = "Session Duration", deserialize_with = "lenient_cell")]
    pub duration: Option<String>,
    #[serde(default, alias = "Session Level", deserialize_with = "lenient_cell")]
    pub level: Option<String>,
    #[serde(default, alias = "Room", deserialize_with = "lenient_cell")]
    pub room: Option<String>,
    #[serde(default, alias = "Agenda", deserialize_with = "lenient_cell")]
    pub agenda: Option<String>,
    #[serde(default, alias = "Sponsors", deserialize_with = "lenient_cell")]
    pub sponsors: Option<String>,
}

/// Accepts strings, numbers, and booleans; maps null, blank, and `nan` to `None`.
fn lenient_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    let text = match value {
        None | Some(serde_yaml::Value::Null) => return Ok(None),
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(serde_yaml::Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar cell, got {other:?}"
            )))
        }
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Normalized entities
// ---------------------------------------------------------------------------

/// A deduplicated speaker (named entity). Keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Speaker {
    pub key: EntityKey,
    pub name: String,
    pub slug: Slug,
    pub headline: String,
    pub bio: String,
    pub linkedin: String,
    pub photo_url: String,
    /// Sessions this speaker presents, in first-seen order.
    pub session_keys: Vec<EntityKey>,
}

impl Speaker {
    /// Speakers without any session are not published.
    pub fn has_sessions(&self) -> bool {
        !self.session_keys.is_empty()
    }
}

/// A grouped session (sequence-coded entity). Keyed by session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub key: EntityKey,
    pub title: String,
    pub abstract_text: String,
    /// Raw duration cell, possibly listing several comma-separated options.
    pub duration: String,
    /// Raw level cell, e.g. `300 (Advanced)`.
    pub level: String,
    pub room: String,
    /// Start time as `HHMM`.
    pub agenda: String,
    pub speaker_slugs: Vec<Slug>,
    pub sponsor_slugs: Vec<Slug>,
}
