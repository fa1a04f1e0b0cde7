//! Integration tests for the serp_results store against a real Postgres.
//!
//! Requirements: Docker (for Postgres via testcontainers)
//!
//! Run with: cargo test -p serp-analytics --features test-utils --test serp_results_test

#![cfg(feature = "test-utils")]

use chrono::{Duration, Utc};
use serde_json::json;

use serp_analytics::{migrate, AnalyticsClient, SerpResultReader, SerpResultWriter};
use serp_common::{AnalyticsStore, ResultRow};

async fn setup() -> (impl std::any::Any, AnalyticsClient) {
    let (container, client) = serp_analytics::testutil::postgres_container().await;
    migrate::ensure_schema(&client)
        .await
        .expect("schema creation failed");
    (container, client)
}

fn row(keyword: &str, rank: u32, payload: serde_json::Value) -> ResultRow {
    ResultRow {
        timestamp: Utc::now(),
        keyword: keyword.to_string(),
        rank,
        url: payload["url"].as_str().unwrap_or_default().to_string(),
        title: payload["title"].as_str().unwrap_or_default().to_string(),
        raw_payload: payload.to_string(),
    }
}

async fn count_rows(client: &AnalyticsClient) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM serp_results")
        .fetch_one(client.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn concurrent_schema_creation_is_idempotent() {
    let (_container, client) = serp_analytics::testutil::postgres_container().await;

    let calls = (0..16).map(|_| {
        let client = client.clone();
        async move { migrate::ensure_schema(&client).await }
    });
    let results = futures::future::join_all(calls).await;
    for result in results {
        result.expect("every concurrent ensure_schema call succeeds");
    }

    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'serp_results'",
    )
    .fetch_one(client.pool())
    .await
    .unwrap();
    assert_eq!(tables, 1);

    let columns: Vec<String> = sqlx::query_scalar(
        "SELECT column_name::text FROM information_schema.columns
         WHERE table_name = 'serp_results' ORDER BY ordinal_position",
    )
    .fetch_all(client.pool())
    .await
    .unwrap();
    assert_eq!(
        columns,
        vec!["timestamp", "keyword", "rank", "url", "title", "data"]
    );

    // And again once it exists
    migrate::ensure_schema(&client).await.unwrap();
}

#[tokio::test]
async fn round_trip_preserves_fields_and_payload() {
    let (_container, client) = setup().await;
    let record = json!({"url": "https://x", "title": "T", "position": {"page": 1}});

    let written = SerpResultWriter::new(client.clone())
        .insert_batch(&[row("rust", 1, record.clone())])
        .await
        .unwrap();
    assert_eq!(written, 1);

    let rows = SerpResultReader::new(client.clone())
        .rows_for_keyword("rust", None, 100)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].url, "https://x");
    assert_eq!(rows[0].title, "T");
    assert_eq!(rows[0].rank, 1);
    let payload: serde_json::Value = serde_json::from_str(&rows[0].raw_payload).unwrap();
    assert_eq!(payload, record);
}

#[tokio::test]
async fn failed_batch_leaves_no_rows_visible() {
    let (_container, client) = setup().await;

    sqlx::query(
        "ALTER TABLE serp_results ADD CONSTRAINT no_rejected_url CHECK (url <> 'https://rejected')",
    )
    .execute(client.pool())
    .await
    .unwrap();

    // Spans two INSERT statements; the last row is rejected by Postgres
    // after the first statement already ran.
    let mut rows: Vec<ResultRow> = (1..=10_001)
        .map(|rank| row("atomic", rank, json!({"url": format!("https://x/{rank}")})))
        .collect();
    rows.push(row("atomic", 10_002, json!({"url": "https://rejected"})));

    let result = SerpResultWriter::new(client.clone())
        .insert_batch(&rows)
        .await;
    assert!(result.is_err());
    assert_eq!(count_rows(&client).await, 0);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let (_container, client) = setup().await;

    let written = client.insert_batch(&[]).await.unwrap();
    assert_eq!(written, 0);
    assert_eq!(count_rows(&client).await, 0);
}

#[tokio::test]
async fn keyword_scan_filters_orders_and_limits() {
    let (_container, client) = setup().await;
    let old = Utc::now() - Duration::hours(2);

    let mut stale = row("rust", 1, json!({"url": "https://old"}));
    stale.timestamp = old;
    let rows = vec![
        stale,
        row("rust", 3, json!({"url": "https://c"})),
        row("rust", 1, json!({"url": "https://a"})),
        row("go", 1, json!({"url": "https://go"})),
    ];
    client.insert_batch(&rows).await.unwrap();

    let all = client.rows_for_keyword("rust", None, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].url, "https://old");

    let recent = client
        .rows_for_keyword("rust", Some(old + Duration::minutes(1)), 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|r| r.keyword == "rust"));

    let limited = client.rows_for_keyword("rust", None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn schema_check_does_not_wait_for_open_batches() {
    let (_container, client) = setup().await;

    let mut open_batch = client.pool().begin().await.unwrap();
    sqlx::query(
        r#"INSERT INTO serp_results ("timestamp", keyword, rank) VALUES (now(), 'open', 1)"#,
    )
    .execute(&mut *open_batch)
    .await
    .unwrap();

    tokio::time::timeout(
        std::time::Duration::from_secs(3),
        migrate::ensure_schema(&client),
    )
    .await
    .expect("schema check waited on an uncommitted batch")
    .unwrap();

    open_batch.rollback().await.unwrap();
}

#[tokio::test]
async fn nul_in_text_fields_does_not_sink_the_batch() {
    let (_container, client) = setup().await;
    let record = json!({"url": "https://b", "title": "bad\u{0}title"});

    let written = client
        .insert_batch(&[
            row("rust", 1, json!({"url": "https://a", "title": "ok"})),
            row("ru\0st", 2, record.clone()),
        ])
        .await
        .unwrap();
    assert_eq!(written, 2);

    let rows = client.rows_for_keyword("rust", None, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].title, "badtitle");
    assert_eq!(rows[1].keyword, "rust");
    let payload: serde_json::Value = serde_json::from_str(&rows[1].raw_payload).unwrap();
    assert_eq!(payload, record);
}
