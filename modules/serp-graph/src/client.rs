use std::time::Duration;

use neo4rs::{query, ConfigBuilder, Graph};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphConnectError {
    #[error(transparent)]
    Neo4j(#[from] neo4rs::Error),

    #[error("timed out after {0:?} connecting to Neo4j")]
    Timeout(Duration),
}

/// Thin wrapper around neo4rs::Graph providing connection setup.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials and verify the session
    /// with a trivial query, all within `timeout`.
    pub async fn connect(
        uri: &str,
        user: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, GraphConnectError> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;

        let connect = async {
            let graph = Graph::connect(config).await?;
            graph.run(query("RETURN 1")).await?;
            Ok::<_, neo4rs::Error>(graph)
        };

        let graph = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| GraphConnectError::Timeout(timeout))??;
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}
