use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{info, warn};

use serp_common::{AnalyticsStore, ConnectionError, GraphStore, StoreConnector, StoreKind};

struct StoreHandles {
    analytics: Arc<dyn AnalyticsStore>,
    graph: Arc<dyn GraphStore>,
}

type InitOutcome = Result<Arc<StoreHandles>, ConnectionError>;

/// Process-wide owner of the two store handles.
///
/// Both stores are connected on first use, analytics first, then graph.
/// The attempt runs on its own task and callers only await its shared
/// outcome, so a caller that is cancelled or times out abandons its own wait
/// and never the attempt itself. Concurrent first callers see the same
/// outcome. The outcome is kept for the life of the process: after a failure
/// every accessor returns the recorded `ConnectionError` without dialing again.
pub struct ConnectionManager {
    connector: Arc<dyn StoreConnector>,
    init: OnceLock<Shared<BoxFuture<'static, InitOutcome>>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            init: OnceLock::new(),
        }
    }

    /// Run the one-time initialization if nobody has yet, and report its outcome.
    pub async fn ensure_initialized(&self) -> Result<(), ConnectionError> {
        self.handles().await.map(|_| ())
    }

    /// Whether an initialization attempt has completed, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.init.get().is_some_and(|init| init.peek().is_some())
    }

    pub async fn analytics_store(&self) -> Result<Arc<dyn AnalyticsStore>, ConnectionError> {
        Ok(self.handles().await?.analytics.clone())
    }

    pub async fn graph_store(&self) -> Result<Arc<dyn GraphStore>, ConnectionError> {
        Ok(self.handles().await?.graph.clone())
    }

    async fn handles(&self) -> InitOutcome {
        let init = self.init.get_or_init(|| {
            let task = tokio::spawn(connect_all(self.connector.clone()));
            async move {
                task.await.unwrap_or_else(|join_err| {
                    Err(ConnectionError::new(
                        StoreKind::Analytics,
                        format!("initialization task failed: {join_err}"),
                    ))
                })
            }
            .boxed()
            .shared()
        });
        init.clone().await
    }
}

async fn connect_all(connector: Arc<dyn StoreConnector>) -> InitOutcome {
    info!("Connecting to backing stores");

    let analytics = connector.connect_analytics().await.inspect_err(|e| {
        warn!(store = %e.store, error = %e.message, "Store initialization failed");
    })?;
    let graph = connector.connect_graph().await.inspect_err(|e| {
        warn!(store = %e.store, error = %e.message, "Store initialization failed");
    })?;

    info!("Backing stores connected");
    Ok(Arc::new(StoreHandles { analytics, graph }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serp_common::testing::{MockAnalyticsStore, MockConnector, MockGraphStore};
    use serp_common::StoreKind;
    use std::time::Duration;

    fn connector() -> MockConnector {
        MockConnector::new(
            Arc::new(MockAnalyticsStore::new()),
            Arc::new(MockGraphStore::new()),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn fifty_concurrent_first_calls_connect_once() {
        let connector = Arc::new(connector().with_delay(Duration::from_millis(50)));
        let manager = Arc::new(ConnectionManager::new(connector.clone()));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let manager = manager.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        manager.analytics_store().await.map(|_| ())
                    } else {
                        manager.graph_store().await.map(|_| ())
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().expect("every caller observes success");
        }
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 1);
    }

    #[tokio::test]
    async fn lazily_connects_on_first_access() {
        let connector = Arc::new(connector());
        let manager = ConnectionManager::new(connector.clone());
        assert!(!manager.is_initialized());
        assert_eq!(connector.analytics_attempts(), 0);

        manager.graph_store().await.unwrap();
        assert!(manager.is_initialized());
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 1);

        manager.analytics_store().await.unwrap();
        manager.ensure_initialized().await.unwrap();
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 1);
    }

    #[tokio::test]
    async fn analytics_failure_skips_graph_and_is_permanent() {
        let connector = Arc::new(connector().failing_analytics("connection refused"));
        let manager = ConnectionManager::new(connector.clone());

        let err = manager.analytics_store().await.err().unwrap();
        assert_eq!(err.store, StoreKind::Analytics);
        assert_eq!(connector.graph_attempts(), 0);

        // Both accessors report the recorded failure; nothing is re-dialed.
        let err = manager.graph_store().await.err().unwrap();
        assert_eq!(err.store, StoreKind::Analytics);
        assert!(manager.ensure_initialized().await.is_err());
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 0);
    }

    #[tokio::test]
    async fn graph_failure_fails_both_accessors() {
        let connector = Arc::new(connector().failing_graph("auth failed"));
        let manager = ConnectionManager::new(connector.clone());

        let err = manager.analytics_store().await.err().unwrap();
        assert_eq!(err.store, StoreKind::Graph);
        assert!(err.message.contains("auth failed"));
        assert!(manager.graph_store().await.is_err());
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_a_failed_attempt() {
        let connector = Arc::new(
            connector()
                .failing_graph("unreachable")
                .with_delay(Duration::from_millis(20)),
        );
        let manager = Arc::new(ConnectionManager::new(connector.clone()));

        let results = futures::future::join_all((0..20).map(|_| {
            let manager = manager.clone();
            async move { manager.ensure_initialized().await }
        }))
        .await;

        assert!(results.iter().all(|r| r.is_err()));
        assert_eq!(connector.graph_attempts(), 1);
    }

    #[tokio::test]
    async fn abandoned_first_caller_does_not_restart_initialization() {
        let connector = Arc::new(
            connector()
                .failing_graph("connection refused")
                .with_delay(Duration::from_millis(50)),
        );
        let manager = ConnectionManager::new(connector.clone());

        let first = tokio::time::timeout(Duration::from_millis(10), manager.graph_store()).await;
        assert!(first.is_err(), "first caller gives up before the dial finishes");

        let err = manager.analytics_store().await.err().unwrap();
        assert_eq!(err.store, StoreKind::Graph);
        assert!(manager.is_initialized());
        assert_eq!(connector.analytics_attempts(), 1);
        assert_eq!(connector.graph_attempts(), 1);
    }
}
