//! Request/response types for the activities.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Input for `ingest_serp_data`.
///
/// Also accepts the capitalized `Keyword`/`Items` keys, and a `null` item
/// list, as sent by callers that serialize untagged structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionRequest {
    #[serde(alias = "Keyword")]
    pub keyword: String,
    /// Opaque SERP items. Only JSON objects produce rows.
    #[serde(alias = "Items", default, deserialize_with = "null_as_empty")]
    pub items: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of `ingest_serp_data`.
///
/// `items_received` counts every item in the request, including ones that
/// were skipped because they were not objects. `rows_written` counts rows
/// actually committed. `message` reports `items_received`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub message: String,
    pub keyword: String,
    pub items_received: usize,
    pub rows_written: usize,
}

impl IngestionSummary {
    pub fn new(keyword: String, items_received: usize, rows_written: usize) -> Self {
        Self {
            message: format!("Ingested {items_received} items"),
            keyword,
            items_received,
            rows_written,
        }
    }

    /// Items that produced no row.
    pub fn items_skipped(&self) -> usize {
        self.items_received.saturating_sub(self.rows_written)
    }
}

impl fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Input for `get_graph_neighbors`: either a bare URL string or `{"url": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NeighborQueryWire")]
pub struct NeighborQuery {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NeighborQueryWire {
    Bare(String),
    Object { url: String },
}

impl From<NeighborQueryWire> for NeighborQuery {
    fn from(wire: NeighborQueryWire) -> Self {
        match wire {
            NeighborQueryWire::Bare(url) | NeighborQueryWire::Object { url } => Self { url },
        }
    }
}

impl NeighborQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Neighbor URLs in store order, at most `NEIGHBOR_LIMIT`. Serialized as a
/// bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborResult(pub Vec<String>);

impl NeighborResult {
    pub fn urls(&self) -> &[String] {
        &self.0
    }

    pub fn into_urls(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
