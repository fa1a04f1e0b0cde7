use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use serp_analytics::AnalyticsClient;
use serp_common::{
    AnalyticsStore, Config, ConnectionError, GraphStore, StoreConnector, StoreKind,
};
use serp_graph::GraphClient;

/// Production connector: Postgres for analytics, Neo4j for the page graph,
/// both addressed by the config resolved at startup.
pub struct EnvConnector {
    config: Config,
}

impl EnvConnector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for EnvConnector {
    async fn connect_analytics(&self) -> Result<Arc<dyn AnalyticsStore>, ConnectionError> {
        let client = AnalyticsClient::connect(&self.config)
            .await
            .map_err(|e| ConnectionError::new(StoreKind::Analytics, e))?;
        info!(addr = %self.config.analytics_addr, "Connected to analytics store");
        Ok(Arc::new(client))
    }

    async fn connect_graph(&self) -> Result<Arc<dyn GraphStore>, ConnectionError> {
        let client = GraphClient::connect(
            &self.config.neo4j_uri,
            &self.config.neo4j_user,
            &self.config.neo4j_password,
            self.config.connect_timeout,
        )
        .await
        .map_err(|e| ConnectionError::new(StoreKind::Graph, e))?;
        info!(uri = %self.config.neo4j_uri, "Connected to graph store");
        Ok(Arc::new(client))
    }
}
