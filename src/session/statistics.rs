use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::Cell;
use crate::session::Session;

/// Board-wide counts for a session, for status displays and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchardStatistics {
    pub generation: u64,
    pub trees: u32,
    pub mature: u32,
    pub spoiled: u32,
    pub ponds: u32,
    pub empty: u32,
    pub trees_by_kind: BTreeMap<String, u32>,
}

impl OrchardStatistics {
    /// Mature trees that are still safe to collect.
    pub fn ripe(&self) -> u32 {
        self.mature - self.spoiled
    }
}

/// Count what is currently growing on the session's board.
pub fn compute_statistics(session: &Session) -> OrchardStatistics {
    let mut stats = OrchardStatistics {
        generation: session.generation(),
        trees: 0,
        mature: 0,
        spoiled: 0,
        ponds: 0,
        empty: 0,
        trees_by_kind: BTreeMap::new(),
    };

    for (_, cell) in session.grid().iter() {
        match cell {
            Cell::Empty => stats.empty += 1,
            Cell::Pond => stats.ponds += 1,
            Cell::Tree(tree) => {
                stats.trees += 1;
                if tree.is_mature() {
                    stats.mature += 1;
                }
                if tree.is_spoiled() {
                    stats.spoiled += 1;
                }
                *stats
                    .trees_by_kind
                    .entry(tree.kind().to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    stats
}
