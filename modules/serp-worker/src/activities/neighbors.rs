use tracing::debug;

use serp_common::NEIGHBOR_LIMIT;

use super::types::{NeighborQuery, NeighborResult};
use crate::connections::ConnectionManager;
use crate::context::ActivityContext;
use crate::error::ActivityError;

/// Up to `NEIGHBOR_LIMIT` pages one outbound link away from `query.url`, in
/// the store's order. Read-only; an unknown or empty URL yields an empty list.
pub async fn get_graph_neighbors(
    connections: &ConnectionManager,
    ctx: &ActivityContext,
    query: NeighborQuery,
) -> Result<NeighborResult, ActivityError> {
    let graph = ctx.guard(connections.graph_store()).await?;

    let mut urls = ctx
        .guard(async {
            graph
                .neighbors(&query.url, NEIGHBOR_LIMIT)
                .await
                .map_err(ActivityError::Query)
        })
        .await?;
    urls.truncate(NEIGHBOR_LIMIT);

    debug!(url = query.url.as_str(), neighbors = urls.len(), "Graph neighbors fetched");
    Ok(NeighborResult(urls))
}
