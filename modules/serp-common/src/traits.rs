// Store abstractions shared by the activity layer and the store crates.
//
// AnalyticsStore: append-only SERP rows (schema assurance, batch commit, reads).
// GraphStore: read-only page link traversal.
// StoreConnector: opens both stores; called at most once per process by the
//   connection manager.
//
// Production impls live in serp-analytics and serp-graph. In-memory doubles
// live in `testing` behind the `test-support` feature.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ConnectionError, StoreError};
use crate::types::ResultRow;

// ---------------------------------------------------------------------------
// AnalyticsStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Create the destination relation if absent. Safe to call concurrently
    /// and repeatedly.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Append all rows as one atomic batch. Returns the number of rows written.
    /// On error nothing from the batch is visible.
    async fn insert_batch(&self, rows: &[ResultRow]) -> Result<u64, StoreError>;

    /// Rows for a keyword ordered by `(timestamp, rank)`, optionally bounded
    /// below by `since`.
    async fn rows_for_keyword(
        &self,
        keyword: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResultRow>, StoreError>;
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// URLs of pages one `LINKS_TO` hop away from `url`, in store order,
    /// at most `limit` of them.
    async fn neighbors(&self, url: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// StoreConnector
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect_analytics(&self) -> Result<Arc<dyn AnalyticsStore>, ConnectionError>;

    async fn connect_graph(&self) -> Result<Arc<dyn GraphStore>, ConnectionError>;
}
