//! Deterministic classifiers over raw source cells.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Bucket;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Bucket used when a level is missing or carries no number.
pub const DEFAULT_BUCKET: Bucket = Bucket(2);

/// Classify a session level such as `300 (Advanced)` into buckets 1..=4.
pub fn level_bucket(level: &str) -> Bucket {
    let Some(first) = NUMBER.find(level) else {
        return DEFAULT_BUCKET;
    };
    match first.as_str().parse::<u64>() {
        Ok(n) if n >= 400 => Bucket(4),
        Ok(n) if n >= 300 => Bucket(3),
        Ok(n) if n >= 200 => Bucket(2),
        Ok(_) => Bucket(1),
        Err(_) => DEFAULT_BUCKET,
    }
}

/// Display name of a level bucket.
pub fn level_name(bucket: Bucket) -> &'static str {
    match bucket.0 {
        1 => "Beginner",
        2 => "Intermediate",
        3 => "Advanced",
        4 => "Expert",
        _ => "Unknown",
    }
}

/// Map one duration option (e.g. `20-30 minutes`) to `"30"` or `"60"`.
///
/// A range collapses to its highest bound; anything above thirty minutes
/// becomes an hour slot.
pub fn standard_duration(option: &str) -> &'static str {
    let max = NUMBER
        .find_iter(option)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .max();
    match max {
        Some(minutes) if minutes > 30 => "60",
        _ => "30",
    }
}

/// Split a duration cell into its comma-separated options, each normalized.
pub fn duration_options(duration: &str) -> Vec<&'static str> {
    if duration.trim().is_empty() {
        return Vec::new();
    }
    duration.split(',').map(|d| standard_duration(d.trim())).collect()
}

/// Build `YYYY-MM-DDTHH:MM:00` from the event date and an `HHMM` agenda slot.
///
/// Returns `None` for a blank, non-numeric, or out-of-range agenda. Three
/// digit slots (`930`, from a cell read as a number) are left-padded.
pub fn session_datetime(event_date: NaiveDate, agenda: &str) -> Option<String> {
    let agenda = agenda.trim();
    if agenda.is_empty() || agenda.len() > 4 || !agenda.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{agenda:0>4}");
    let hours: u32 = padded[..2].parse().ok()?;
    let minutes: u32 = padded[2..].parse().ok()?;
    let datetime = event_date.and_hms_opt(hours, minutes, 0)?;
    Some(datetime.format("%Y-%m-%dT%H:%M:00").to_string())
}

/// Session ids issued by the submission form are UUIDs.
pub fn is_uuid_like(id: &str) -> bool {
    static UUID: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("valid regex")
    });
    UUID.is_match(id)
}
