use chrono::{DateTime, Utc};

use serp_common::{storable_text, ResultRow};

use crate::AnalyticsClient;

#[derive(sqlx::FromRow)]
struct SerpResultRecord {
    timestamp: DateTime<Utc>,
    keyword: String,
    rank: i64,
    url: String,
    title: String,
    data: String,
}

impl TryFrom<SerpResultRecord> for ResultRow {
    type Error = sqlx::Error;

    fn try_from(r: SerpResultRecord) -> Result<Self, Self::Error> {
        let rank = u32::try_from(r.rank).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(ResultRow {
            timestamp: r.timestamp,
            keyword: r.keyword,
            rank,
            url: r.url,
            title: r.title,
            raw_payload: r.data,
        })
    }
}

/// Keyword range scans over `serp_results`.
pub struct SerpResultReader {
    client: AnalyticsClient,
}

impl SerpResultReader {
    pub fn new(client: AnalyticsClient) -> Self {
        Self { client }
    }

    /// Rows for `keyword` ordered by `(timestamp, rank)`, optionally starting
    /// at `since` (inclusive).
    pub async fn rows_for_keyword(
        &self,
        keyword: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResultRow>, sqlx::Error> {
        let records = sqlx::query_as::<_, SerpResultRecord>(
            r#"
            SELECT "timestamp", keyword, rank, url, title, data
            FROM serp_results
            WHERE keyword = $1
              AND ($2::timestamptz IS NULL OR "timestamp" >= $2)
            ORDER BY "timestamp" ASC, rank ASC
            LIMIT $3
            "#,
        )
        .bind(storable_text(keyword))
        .bind(since)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.client.pool)
        .await?;

        records.into_iter().map(ResultRow::try_from).collect()
    }
}
