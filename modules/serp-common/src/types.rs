use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Destination relation for ingested SERP rows.
pub const SERP_RESULTS_TABLE: &str = "serp_results";

/// Maximum number of neighbor URLs returned for one page.
pub const NEIGHBOR_LIMIT: usize = 10;

/// One stored row of the `serp_results` relation.
///
/// `rank` is the 1-based position of the source item in its request. Ranks of
/// skipped items are never reused, so ranks within a batch may have gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub timestamp: DateTime<Utc>,
    pub keyword: String,
    pub rank: u32,
    pub url: String,
    pub title: String,
    /// The full source record as JSON text. Stored in the `data` column.
    pub raw_payload: String,
}

/// The two backing stores the worker talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    Analytics,
    Graph,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Analytics => write!(f, "analytics store"),
            StoreKind::Graph => write!(f, "graph store"),
        }
    }
}
