//! Slug derivation for named entities.
//!
//! Slugs are derived from the name alone, so the same name yields the same
//! base slug on every run. Uniqueness is only guaranteed within one run:
//! colliding names get `-2`, `-3`, … in allocation order, and that order is
//! whatever order the caller feeds names in.

use std::collections::HashSet;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::types::Slug;

/// Substituted when a name normalizes to nothing.
pub const FALLBACK_SLUG: &str = "unknown-speaker";

/// Lowercase, strip diacritics, collapse non-alphanumeric runs to `-`, trim.
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Per-run allocator of unique slugs. Never persisted.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    used: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the allocator with slugs that are already taken in this run.
    pub fn with_used<I, S>(used: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: used.into_iter().map(Into::into).collect(),
        }
    }

    /// Return a slug for `name` that no earlier call in this run returned.
    pub fn allocate(&mut self, name: &str) -> Slug {
        let base = normalize(name);
        if self.used.insert(base.clone()) {
            return Slug(base);
        }
        let mut suffix = 2u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if self.used.insert(candidate.clone()) {
                return Slug(candidate);
            }
            suffix += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
