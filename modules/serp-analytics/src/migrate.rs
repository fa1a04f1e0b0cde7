use tracing::{debug, info};

use crate::AnalyticsClient;

/// Advisory lock key serializing schema creation across workers ("SERP").
const SCHEMA_LOCK_KEY: i64 = 0x5345_5250;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS serp_results (
    "timestamp" TIMESTAMPTZ NOT NULL,
    keyword     TEXT        NOT NULL,
    rank        BIGINT      NOT NULL CHECK (rank BETWEEN 0 AND 4294967295),
    url         TEXT        NOT NULL DEFAULT '',
    title       TEXT        NOT NULL DEFAULT '',
    data        TEXT        NOT NULL DEFAULT ''
)
"#;

const CREATE_KEYWORD_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS serp_results_keyword_timestamp_idx
    ON serp_results (keyword, "timestamp")
"#;

const SCHEMA_PRESENT: &str = r#"
SELECT to_regclass('serp_results') IS NOT NULL
   AND to_regclass('serp_results_keyword_timestamp_idx') IS NOT NULL
"#;

/// Create `serp_results` and its `(keyword, timestamp)` index if absent.
///
/// Existence is checked through the catalog first, which takes no lock on the
/// table, so the common path never waits behind open insert transactions.
/// Only when something is missing does creation run, under a
/// transaction-scoped advisory lock: `IF NOT EXISTS` alone still races on the
/// catalog when two sessions create the same relation at once.
pub async fn ensure_schema(client: &AnalyticsClient) -> Result<(), sqlx::Error> {
    let present: bool = sqlx::query_scalar(SCHEMA_PRESENT)
        .fetch_one(&client.pool)
        .await?;
    if present {
        return Ok(());
    }

    let mut tx = client.pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    // Another worker may have finished while we waited for the lock.
    let present: bool = sqlx::query_scalar(SCHEMA_PRESENT)
        .fetch_one(&mut *tx)
        .await?;
    if !present {
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_KEYWORD_INDEX).execute(&mut *tx).await?;
        info!("Created serp_results schema");
    }

    tx.commit().await?;
    debug!("serp_results schema ensured");
    Ok(())
}
