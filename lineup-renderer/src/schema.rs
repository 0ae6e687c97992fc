//! Fixed field schemas used to decide whether an artifact changed.
//!
//! Each artifact kind declares its front-matter fields in order, with a
//! comparison mode. Multi-valued fields compare as sets because source row
//! order carries no meaning. The body is always compared as trimmed text.

use std::collections::BTreeSet;

use crate::frontmatter::{self, Document, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Exact equality of the parsed value (absent == absent).
    Scalar,
    /// Equality of the value sets; absent and `[]` are both the empty set.
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub mode: CompareMode,
}

const fn scalar(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        mode: CompareMode::Scalar,
    }
}

const fn set(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        mode: CompareMode::Set,
    }
}

pub const SPEAKER_FIELDS: &[FieldSpec] = &[
    scalar("title"),
    scalar("headline"),
    scalar("linkedin"),
];

pub const SESSION_FIELDS: &[FieldSpec] = &[
    scalar("id"),
    scalar("title"),
    scalar("date"),
    set("speakers"),
    scalar("room"),
    scalar("agenda"),
    set("sponsors"),
    scalar("duration"),
];

/// Name reported for a body difference.
pub const BODY: &str = "body";

fn as_set(value: Option<&FieldValue>) -> BTreeSet<&str> {
    match value {
        None => BTreeSet::new(),
        Some(FieldValue::Text(s)) => std::iter::once(s.as_str()).collect(),
        Some(FieldValue::List(items)) | Some(FieldValue::Disabled(items)) => {
            items.iter().map(String::as_str).collect()
        }
    }
}

/// Field names whose values differ between two parsed documents.
pub fn changed_fields(
    schema: &[FieldSpec],
    candidate: &Document,
    existing: &Document,
) -> Vec<&'static str> {
    let mut changed = Vec::new();
    for field in schema {
        let a = candidate.get(field.name);
        let b = existing.get(field.name);
        let equal = match field.mode {
            CompareMode::Scalar => a == b,
            CompareMode::Set => as_set(a) == as_set(b),
        };
        if !equal {
            changed.push(field.name);
        }
    }
    if candidate.body != existing.body {
        changed.push(BODY);
    }
    changed
}

/// Parse both texts and report differing fields. Empty means "unchanged".
pub fn diff_content(schema: &[FieldSpec], candidate: &str, existing: &str) -> Vec<&'static str> {
    changed_fields(schema, &frontmatter::parse(candidate), &frontmatter::parse(existing))
}
