use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use serp_common::{as_record, storable_text, text_field, ResultRow};

use super::types::{IngestionRequest, IngestionSummary};
use crate::connections::ConnectionManager;
use crate::context::ActivityContext;
use crate::error::ActivityError;

/// Rows built from one request.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    pub rows: Vec<ResultRow>,
    /// Items that were not field mappings and produced no row.
    pub skipped: usize,
}

/// Turn request items into rows, in order.
///
/// Rank is the item's 1-based position in `items`. Non-object items are
/// skipped without renumbering the rest, so ranks can have gaps. `url` and
/// `title` are empty when missing or not text. Text columns have NUL
/// characters dropped; `raw_payload` keeps the item as received. Each row gets
/// its own timestamp at construction.
pub fn build_rows(keyword: &str, items: &[Value]) -> RowBatch {
    let keyword_text = storable_text(keyword);
    let mut batch = RowBatch {
        rows: Vec::with_capacity(items.len()),
        skipped: 0,
    };

    for (index, item) in items.iter().enumerate() {
        let rank = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let Some(record) = as_record(item) else {
            debug!(keyword, rank, "Skipping SERP item that is not an object");
            batch.skipped += 1;
            continue;
        };

        // Best-effort capture: a payload that fails to encode is stored empty.
        let raw_payload = serde_json::to_string(item).unwrap_or_else(|e| {
            warn!(keyword, rank, error = %e, "Failed to encode SERP item payload");
            String::new()
        });

        batch.rows.push(ResultRow {
            timestamp: Utc::now(),
            keyword: keyword_text.clone(),
            rank,
            url: storable_text(text_field(record, "url").unwrap_or_default()),
            title: storable_text(text_field(record, "title").unwrap_or_default()),
            raw_payload,
        });
    }

    batch
}

/// Persist one request's SERP items as a single atomic batch.
///
/// Ensures `serp_results` exists, builds rows, and commits them together.
/// A failed commit leaves no rows behind; the orchestrator may rerun the
/// whole activity, which can duplicate rows if an earlier commit landed but
/// its acknowledgment was lost.
pub async fn ingest_serp_data(
    connections: &ConnectionManager,
    ctx: &ActivityContext,
    req: IngestionRequest,
) -> Result<IngestionSummary, ActivityError> {
    if req.keyword.trim().is_empty() {
        return Err(ActivityError::InvalidInput("keyword must not be empty".into()));
    }

    let store = ctx.guard(connections.analytics_store()).await?;

    ctx.guard(async { store.ensure_schema().await.map_err(ActivityError::Schema) })
        .await?;

    let batch = build_rows(&req.keyword, &req.items);

    let written = ctx
        .guard(async {
            store
                .insert_batch(&batch.rows)
                .await
                .map_err(ActivityError::Ingestion)
        })
        .await?;

    let summary = IngestionSummary::new(req.keyword, req.items.len(), written as usize);
    info!(
        keyword = summary.keyword.as_str(),
        items = summary.items_received,
        rows = summary.rows_written,
        skipped = batch.skipped,
        "SERP batch ingested"
    );
    Ok(summary)
}
