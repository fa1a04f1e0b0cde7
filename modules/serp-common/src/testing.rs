// In-memory doubles for the store traits.
//
// - MockAnalyticsStore (AnalyticsStore): committed rows in a Vec, with
//   injectable schema and commit faults
// - MockGraphStore (GraphStore): adjacency lists keyed by page URL
// - MockConnector (StoreConnector): hands out the mocks and counts
//   connection attempts per store
//
// No network, no database, no Docker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ConnectionError, StoreError};
use crate::traits::{AnalyticsStore, GraphStore, StoreConnector};
use crate::types::{ResultRow, StoreKind};

// ---------------------------------------------------------------------------
// MockAnalyticsStore
// ---------------------------------------------------------------------------

/// Append-only row store. A batch is staged and only published to
/// `rows()` after the (possibly faulted) commit point.
#[derive(Default)]
pub struct MockAnalyticsStore {
    table_exists: AtomicBool,
    schema_calls: AtomicUsize,
    tables_created: AtomicUsize,
    fail_schema: Mutex<Option<String>>,
    fail_next_commit: Mutex<Option<String>>,
    rows: Mutex<Vec<ResultRow>>,
}

impl MockAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `ensure_schema` call fails with `message`.
    pub fn failing_schema(self, message: &str) -> Self {
        *self.fail_schema.lock().unwrap() = Some(message.to_string());
        self
    }

    /// The next batch is built and staged, then fails at commit.
    pub fn fail_next_commit(&self, message: &str) {
        *self.fail_next_commit.lock().unwrap() = Some(message.to_string());
    }

    /// All committed rows, in commit order.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn table_exists(&self) -> bool {
        self.table_exists.load(Ordering::SeqCst)
    }

    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }

    /// How many times the relation was actually created (0 or 1).
    pub fn tables_created(&self) -> usize {
        self.tables_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsStore for MockAnalyticsStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_schema.lock().unwrap().clone() {
            return Err(StoreError::new(message));
        }
        if self
            .table_exists
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.tables_created.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn insert_batch(&self, rows: &[ResultRow]) -> Result<u64, StoreError> {
        if !self.table_exists() {
            return Err(StoreError::new("relation \"serp_results\" does not exist"));
        }
        // Postgres refuses NUL in TEXT and fails the whole statement.
        if rows
            .iter()
            .any(|r| [&r.keyword, &r.url, &r.title].iter().any(|t| t.contains('\0')))
        {
            return Err(StoreError::new(
                "invalid byte sequence for encoding \"UTF8\": 0x00",
            ));
        }
        let staged = rows.to_vec();
        if let Some(message) = self.fail_next_commit.lock().unwrap().take() {
            return Err(StoreError::new(message));
        }
        let written = staged.len() as u64;
        self.rows.lock().unwrap().extend(staged);
        Ok(written)
    }

    async fn rows_for_keyword(
        &self,
        keyword: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResultRow>, StoreError> {
        let mut matching: Vec<ResultRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.keyword == keyword)
            .filter(|r| since.map_or(true, |s| r.timestamp >= s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (a.timestamp, a.rank).cmp(&(b.timestamp, b.rank)));
        matching.truncate(limit);
        Ok(matching)
    }
}

// ---------------------------------------------------------------------------
// MockGraphStore
// ---------------------------------------------------------------------------

/// Adjacency-list page graph. Neighbors come back in insertion order.
#[derive(Default)]
pub struct MockGraphStore {
    links: HashMap<String, Vec<String>>,
    failure: Option<String>,
    queries: AtomicUsize,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add outbound `LINKS_TO` edges from `url`.
    pub fn with_links<I, S>(mut self, url: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links
            .entry(url.to_string())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        self
    }

    /// Every query fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn neighbors(&self, url: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(StoreError::new(message.clone()));
        }
        Ok(self
            .links
            .get(url)
            .map(|targets| targets.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockConnector
// ---------------------------------------------------------------------------

/// Hands out fixed store instances and counts connection attempts.
pub struct MockConnector {
    analytics: Arc<MockAnalyticsStore>,
    graph: Arc<MockGraphStore>,
    analytics_attempts: AtomicUsize,
    graph_attempts: AtomicUsize,
    analytics_failure: Option<String>,
    graph_failure: Option<String>,
    delay: Duration,
}

impl MockConnector {
    pub fn new(analytics: Arc<MockAnalyticsStore>, graph: Arc<MockGraphStore>) -> Self {
        Self {
            analytics,
            graph,
            analytics_attempts: AtomicUsize::new(0),
            graph_attempts: AtomicUsize::new(0),
            analytics_failure: None,
            graph_failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_analytics(mut self, message: &str) -> Self {
        self.analytics_failure = Some(message.to_string());
        self
    }

    pub fn failing_graph(mut self, message: &str) -> Self {
        self.graph_failure = Some(message.to_string());
        self
    }

    /// Simulated dial latency per store, to widen the initialization race.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn analytics_attempts(&self) -> usize {
        self.analytics_attempts.load(Ordering::SeqCst)
    }

    pub fn graph_attempts(&self) -> usize {
        self.graph_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn connect_analytics(&self) -> Result<Arc<dyn AnalyticsStore>, ConnectionError> {
        self.analytics_attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.analytics_failure {
            Some(message) => Err(ConnectionError::new(StoreKind::Analytics, message)),
            None => Ok(self.analytics.clone() as Arc<dyn AnalyticsStore>),
        }
    }

    async fn connect_graph(&self) -> Result<Arc<dyn GraphStore>, ConnectionError> {
        self.graph_attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.graph_failure {
            Some(message) => Err(ConnectionError::new(StoreKind::Graph, message)),
            None => Ok(self.graph.clone() as Arc<dyn GraphStore>),
        }
    }
}
