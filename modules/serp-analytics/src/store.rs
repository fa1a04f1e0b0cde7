use async_trait::async_trait;
use chrono::{DateTime, Utc};

use serp_common::{AnalyticsStore, ResultRow, StoreError};

use crate::{migrate, AnalyticsClient, SerpResultReader, SerpResultWriter};

#[async_trait]
impl AnalyticsStore for AnalyticsClient {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        migrate::ensure_schema(self).await.map_err(StoreError::new)
    }

    async fn insert_batch(&self, rows: &[ResultRow]) -> Result<u64, StoreError> {
        SerpResultWriter::new(self.clone())
            .insert_batch(rows)
            .await
            .map_err(StoreError::new)
    }

    async fn rows_for_keyword(
        &self,
        keyword: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResultRow>, StoreError> {
        SerpResultReader::new(self.clone())
            .rows_for_keyword(keyword, since, limit)
            .await
            .map_err(StoreError::new)
    }
}
