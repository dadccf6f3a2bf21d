use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Per-kind collection counts. The key set is fixed when a session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    counts: BTreeMap<String, u32>,
}

impl Ledger {
    /// A ledger tracking each given kind at zero.
    pub fn seeded<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ledger {
            counts: kinds.into_iter().map(|k| (k.into(), 0)).collect(),
        }
    }

    /// Count one collected fruit and return the new total. A kind that is
    /// not tracked yet starts at one.
    pub fn record(&mut self, kind: &str) -> u32 {
        let count = self.counts.entry(kind.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// The count for `kind`, or `None` if the kind is not tracked.
    pub fn count(&self, kind: &str) -> Option<u32> {
        self.counts.get(kind).copied()
    }

    pub fn is_tracking(&self, kind: &str) -> bool {
        self.counts.contains_key(kind)
    }

    /// A copy of the tracked kinds; changing it does not affect the ledger.
    pub fn kinds(&self) -> BTreeSet<String> {
        self.counts.keys().cloned().collect()
    }

    /// True when every tracked kind has at least `min_per_kind`. An empty
    /// ledger is trivially complete.
    pub fn goal_met(&self, min_per_kind: u32) -> bool {
        self.counts.values().all(|&count| count >= min_per_kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(kind, &count)| (kind.as_str(), count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
