//! Two-phase short-code allocation.
//!
//! [`Reservations::reserve`] hands out codes for every sequence-coded entity
//! in a run without touching the ledger: known keys reuse their permanent
//! code, new keys get a *tentative* code minted from a working copy of the
//! bucket counter. [`Reservations::commit`] moves one tentative code into the
//! ledger once its artifact is known to be on disk. Whatever is never
//! committed is dropped with the `Reservations` value, so a failed write
//! never consumes a counter value.

use std::collections::{BTreeMap, HashSet};

use lineup_core::ledger::IdLedger;
use lineup_core::types::{Bucket, EntityKey, ShortCode};

#[derive(Debug, Clone, Default)]
pub struct Reservations {
    prefix: String,
    tentative: BTreeMap<EntityKey, ShortCode>,
    working_counters: BTreeMap<Bucket, u32>,
}

impl Reservations {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Assign a code to each `(key, bucket)` pair.
    ///
    /// Entities are processed in key order whatever order they arrive in, so
    /// a stable input set always mints the same codes. Repeated keys get one
    /// code. The ledger is only read.
    pub fn reserve<'a, I>(&mut self, ledger: &IdLedger, entities: I) -> BTreeMap<EntityKey, String>
    where
        I: IntoIterator<Item = (&'a EntityKey, Bucket)>,
    {
        let mut ordered: Vec<(&EntityKey, Bucket)> = entities.into_iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(b.0));
        ordered.dedup_by(|a, b| a.0 == b.0);

        let mut issued: HashSet<String> = ledger.mapping.values().cloned().collect();
        issued.extend(self.tentative.values().map(ShortCode::to_string));

        let mut codes = BTreeMap::new();
        for (key, bucket) in ordered {
            if let Some(code) = ledger.code_for(key) {
                codes.insert(key.clone(), code.to_string());
                continue;
            }
            if let Some(code) = self.tentative.get(key) {
                codes.insert(key.clone(), code.to_string());
                continue;
            }

            let counter = self
                .working_counters
                .entry(bucket)
                .or_insert_with(|| ledger.counter(bucket));
            // Step past codes an edited ledger may hold above its counter.
            let code = loop {
                *counter += 1;
                let candidate = ShortCode::new(self.prefix.clone(), bucket, *counter);
                if !issued.contains(&candidate.to_string()) {
                    break candidate;
                }
            };
            tracing::debug!("reserved {code} for {key}");
            issued.insert(code.to_string());
            codes.insert(key.clone(), code.to_string());
            self.tentative.insert(key.clone(), code);
        }
        codes
    }

    /// Make the tentative code of `key` permanent.
    ///
    /// No-op returning `false` when `key` holds no tentative reservation,
    /// which is the case for keys already mapped before the run.
    pub fn commit(&mut self, ledger: &mut IdLedger, key: &EntityKey) -> bool {
        match self.tentative.remove(key) {
            Some(code) => {
                let recorded = ledger.record(key, &code);
                if recorded {
                    tracing::info!("committed {code} for {key}");
                }
                recorded
            }
            None => false,
        }
    }

    pub fn tentative(&self, key: &EntityKey) -> Option<&ShortCode> {
        self.tentative.get(key)
    }

    /// Reservations not (yet) committed.
    pub fn pending(&self) -> usize {
        self.tentative.len()
    }
}
