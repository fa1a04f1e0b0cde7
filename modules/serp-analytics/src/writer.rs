use sqlx::{Postgres, QueryBuilder};
use tracing::debug;

use serp_common::{storable_text, ResultRow};

use crate::AnalyticsClient;

/// Rows per INSERT statement. Six binds per row keeps each statement under
/// the Postgres limit of 65535 bind parameters.
const INSERT_CHUNK_ROWS: usize = 10_000;

/// Append-only writer for `serp_results`.
pub struct SerpResultWriter {
    client: AnalyticsClient,
}

impl SerpResultWriter {
    pub fn new(client: AnalyticsClient) -> Self {
        Self { client }
    }

    /// Append all rows in one transaction. Either every row becomes visible
    /// at commit or none does; dropping the future before commit rolls back.
    /// NUL characters are dropped from text columns, since `TEXT` cannot
    /// hold them.
    pub async fn insert_batch(&self, rows: &[ResultRow]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.client.pool.begin().await?;
        let mut written = 0u64;

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO serp_results ("timestamp", keyword, rank, url, title, data) "#,
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.timestamp)
                    .push_bind(storable_text(&row.keyword))
                    .push_bind(i64::from(row.rank))
                    .push_bind(storable_text(&row.url))
                    .push_bind(storable_text(&row.title))
                    .push_bind(row.raw_payload.as_str());
            });
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        debug!(rows = written, "serp_results batch committed");
        Ok(written)
    }
}
