//! Persistent identifier ledger.
//!
//! Maps each sequence-coded entity's external key to the short code it was
//! issued, plus a per-bucket high-water counter used to mint new codes.
//!
//! ```json
//! {
//!   "mapping": { "S1": "B201" },
//!   "counters": { "2": 1 }
//! }
//! ```
//!
//! The mapping is append-only and counters never decrease. The ledger is
//! loaded once at the start of a run and saved once at the end, using the
//! same `.tmp` + rename pattern as every other persisted file.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ledger_io_err, CoreError};
use crate::types::{Bucket, EntityKey, ShortCode};

/// In-memory ledger value. Pass it into a run and persist it afterwards;
/// it is never held as ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdLedger {
    pub mapping: BTreeMap<EntityKey, String>,
    pub counters: BTreeMap<Bucket, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LedgerCompat {
    Current(CurrentCompat),
    Legacy(LegacyCompat),
}

#[derive(Debug, Deserialize)]
struct CurrentCompat {
    mapping: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_counters")]
    counters: BTreeMap<Bucket, u32>,
}

/// Shape written by the first generation of the tool.
#[derive(Debug, Deserialize)]
struct LegacyCompat {
    session_id_mapping: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_counters")]
    level_counters: BTreeMap<Bucket, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CounterValue {
    Int(u32),
    Text(String),
}

/// Counter maps are read through string keys because untagged buffering
/// does not coerce `"2"` into an integer key.
fn lenient_counters<'de, D>(deserializer: D) -> Result<BTreeMap<Bucket, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, CounterValue>::deserialize(deserializer)?;
    let mut counters = BTreeMap::new();
    for (bucket, value) in raw {
        let bucket: u8 = bucket
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid bucket '{bucket}'")))?;
        let value = match value {
            CounterValue::Int(n) => n,
            CounterValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid counter '{s}'")))?,
        };
        counters.insert(Bucket(bucket), value);
    }
    Ok(counters)
}

fn normalize_code(code: String) -> String {
    match code.strip_suffix(".md") {
        Some(stripped) => stripped.to_string(),
        None => code,
    }
}

impl From<LedgerCompat> for IdLedger {
    fn from(compat: LedgerCompat) -> Self {
        let (mapping, counters) = match compat {
            LedgerCompat::Current(c) => (c.mapping, c.counters),
            LedgerCompat::Legacy(l) => (l.session_id_mapping, l.level_counters),
        };
        IdLedger {
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (EntityKey(k), normalize_code(v)))
                .collect(),
            counters,
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Load the ledger at `path`.
///
/// Returns an empty ledger (all counters implicitly zero) if the file does
/// not exist. Any other read or parse failure is fatal.
pub fn load_at(path: &Path) -> Result<IdLedger, CoreError> {
    if !path.exists() {
        tracing::debug!("no ledger at {}, starting empty", path.display());
        return Ok(IdLedger::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ledger_io_err(path, e))?;
    let compat: LedgerCompat =
        serde_json::from_str(&contents).map_err(|e| CoreError::LedgerParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(IdLedger::from(compat))
}

/// Save the ledger atomically: write `<path>.tmp`, then rename over `<path>`.
pub fn save_at(path: &Path, ledger: &IdLedger) -> Result<(), CoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| ledger_io_err(dir, e))?;
        }
    }

    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| ledger_io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ledger_io_err(path, e));
    }
    tracing::debug!("saved ledger to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries and mutation
// ---------------------------------------------------------------------------

impl IdLedger {
    /// The code permanently issued to `key`, if any.
    pub fn code_for(&self, key: &EntityKey) -> Option<&str> {
        self.mapping.get(key).map(String::as_str)
    }

    /// Last-issued sequence number for `bucket` (zero if never used).
    pub fn counter(&self, bucket: Bucket) -> u32 {
        self.counters.get(&bucket).copied().unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.mapping.keys()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Make `code` the permanent code of `key` and raise its bucket counter
    /// to at least the code's number.
    ///
    /// Append-only: if `key` already holds a different code the existing one
    /// wins and `false` is returned.
    pub fn record(&mut self, key: &EntityKey, code: &ShortCode) -> bool {
        let rendered = code.to_string();
        if let Some(existing) = self.mapping.get(key) {
            if *existing != rendered {
                tracing::warn!(
                    "refusing to remap {key}: already holds {existing}, ignoring {rendered}"
                );
                return false;
            }
        } else {
            self.mapping.insert(key.clone(), rendered);
        }
        let counter = self.counters.entry(code.bucket).or_insert(0);
        *counter = (*counter).max(code.number);
        true
    }

    /// Check the ledger invariants. An empty result means the ledger is sound.
    pub fn verify(&self) -> Vec<LedgerViolation> {
        let mut violations = Vec::new();
        let mut by_code: HashMap<&str, Vec<EntityKey>> = HashMap::new();

        for (key, code) in &self.mapping {
            by_code.entry(code.as_str()).or_default().push(key.clone());
            match code.parse::<ShortCode>() {
                Ok(parsed) => {
                    let counter = self.counter(parsed.bucket);
                    if counter < parsed.number {
                        violations.push(LedgerViolation::CounterBehind {
                            key: key.clone(),
                            code: code.clone(),
                            counter,
                        });
                    }
                }
                Err(_) => violations.push(LedgerViolation::MalformedCode {
                    key: key.clone(),
                    code: code.clone(),
                }),
            }
        }

        let mut duplicates: Vec<_> = by_code
            .into_iter()
            .filter(|(_, keys)| keys.len() > 1)
            .map(|(code, keys)| LedgerViolation::DuplicateCode {
                code: code.to_string(),
                keys,
            })
            .collect();
        duplicates.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        violations.extend(duplicates);
        violations
    }
}

/// A broken ledger invariant reported by [`IdLedger::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    MalformedCode {
        key: EntityKey,
        code: String,
    },
    CounterBehind {
        key: EntityKey,
        code: String,
        counter: u32,
    },
    DuplicateCode {
        code: String,
        keys: Vec<EntityKey>,
    },
}

impl fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerViolation::MalformedCode { key, code } => {
                write!(f, "{key}: malformed code '{code}'")
            }
            LedgerViolation::CounterBehind { key, code, counter } => {
                write!(f, "{key}: code {code} is ahead of its bucket counter ({counter})")
            }
            LedgerViolation::DuplicateCode { code, keys } => {
                let keys: Vec<_> = keys.iter().map(|k| k.0.as_str()).collect();
                write!(f, "{code}: issued to several keys ({})", keys.join(", "))
            }
        }
    }
}
