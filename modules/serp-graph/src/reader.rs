use async_trait::async_trait;
use neo4rs::query;
use tracing::debug;

use serp_common::{GraphStore, StoreError};

use crate::GraphClient;

const NEIGHBORS_QUERY: &str = "MATCH (p:Page {url: $url})-[:LINKS_TO]->(neighbor)
     RETURN neighbor.url AS url
     LIMIT $limit";

/// Read-only page link traversal. Does not expose raw Cypher or writes.
pub struct NeighborReader {
    client: GraphClient,
}

impl NeighborReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// URLs one `LINKS_TO` hop out from the page with `url`, in the order the
    /// store returns them. Rows whose `url` is missing or not text are skipped.
    /// An unknown page yields an empty list.
    pub async fn neighbors(&self, url: &str, limit: usize) -> Result<Vec<String>, neo4rs::Error> {
        let q = query(NEIGHBORS_QUERY)
            .param("url", url)
            .param("limit", i64::try_from(limit).unwrap_or(i64::MAX));

        // The row stream owns its pooled connection and returns it on drop,
        // including when `?` exits early.
        let mut stream = self.client.graph.execute(q).await?;
        let mut urls = Vec::new();
        while let Some(row) = stream.next().await? {
            match row.get::<String>("url") {
                Ok(neighbor) => urls.push(neighbor),
                Err(e) => debug!(error = %e, "Skipping neighbor without a text url"),
            }
        }

        Ok(urls)
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn neighbors(&self, url: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        NeighborReader::new(self.clone())
            .neighbors(url, limit)
            .await
            .map_err(StoreError::new)
    }
}
