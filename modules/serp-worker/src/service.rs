//! Restate service exposing the activities to the orchestrator.
//!
//! Each invocation runs on its own Tokio task. If the runtime abandons the
//! invocation (abort, timeout, lost connection) the handler future is dropped,
//! which cancels the task's `ActivityContext` so it stops at the next I/O
//! boundary. Retry and backoff stay with Restate: retryable failures are
//! returned as plain errors, input errors as `TerminalError`.

use std::future::Future;
use std::sync::Arc;

use restate_sdk::prelude::*;
use tracing::warn;

use crate::activities::{
    self, IngestionRequest, IngestionSummary, NeighborQuery, NeighborResult,
};
use crate::connections::ConnectionManager;
use crate::context::ActivityContext;
use crate::error::ActivityError;

/// Shared dependency container for the activity service.
pub struct WorkerDeps {
    pub connections: ConnectionManager,
}

#[restate_sdk::service]
#[name = "SerpActivities"]
pub trait SerpActivities {
    async fn ingest_serp_data(req: IngestionRequest) -> Result<IngestionSummary, HandlerError>;
    async fn get_graph_neighbors(req: NeighborQuery) -> Result<NeighborResult, HandlerError>;
}

pub struct SerpActivitiesImpl {
    deps: Arc<WorkerDeps>,
}

impl SerpActivitiesImpl {
    pub fn with_deps(deps: Arc<WorkerDeps>) -> Self {
        Self { deps }
    }
}

impl SerpActivities for SerpActivitiesImpl {
    async fn ingest_serp_data(
        &self,
        _ctx: Context<'_>,
        req: IngestionRequest,
    ) -> Result<IngestionSummary, HandlerError> {
        let deps = self.deps.clone();
        spawn_activity("SerpActivities/ingest_serp_data", move |ctx| async move {
            activities::ingest_serp_data(&deps.connections, &ctx, req).await
        })
        .await
    }

    async fn get_graph_neighbors(
        &self,
        _ctx: Context<'_>,
        req: NeighborQuery,
    ) -> Result<NeighborResult, HandlerError> {
        let deps = self.deps.clone();
        spawn_activity("SerpActivities/get_graph_neighbors", move |ctx| async move {
            activities::get_graph_neighbors(&deps.connections, &ctx, req).await
        })
        .await
    }
}

/// Run an activity body on its own task, tied to the handler's lifetime.
async fn spawn_activity<F, Fut, T>(name: &'static str, body: F) -> Result<T, HandlerError>
where
    F: FnOnce(ActivityContext) -> Fut,
    Fut: Future<Output = Result<T, ActivityError>> + Send + 'static,
    T: Send + 'static,
{
    let ctx = ActivityContext::new();
    let _cancel_on_drop = ctx.cancel_on_drop();

    let outcome = match tokio::spawn(body(ctx)).await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            warn!(activity = name, error = %join_err, "Activity task panicked");
            return Err(TerminalError::new(format!("{name} panicked: {join_err}")).into());
        }
    };

    outcome.map_err(|e| {
        warn!(activity = name, error = %e, retryable = e.is_retryable(), "Activity failed");
        into_handler_error(e)
    })
}

fn into_handler_error(err: ActivityError) -> HandlerError {
    if err.is_retryable() {
        err.into()
    } else {
        TerminalError::new(err.to_string()).into()
    }
}

// ---------------------------------------------------------------------------
// Restate serde bridge
// ---------------------------------------------------------------------------

/// Implement Restate SDK serialization traits for types that already have serde derives.
#[macro_export]
macro_rules! impl_restate_serde {
    ($type:ty) => {
        impl restate_sdk::serde::Serialize for $type {
            type Error = serde_json::Error;

            fn serialize(&self) -> Result<bytes::Bytes, Self::Error> {
                serde_json::to_vec(self).map(bytes::Bytes::from)
            }
        }

        impl restate_sdk::serde::Deserialize for $type {
            type Error = serde_json::Error;

            fn deserialize(bytes: &mut bytes::Bytes) -> Result<Self, Self::Error> {
                serde_json::from_slice(bytes)
            }
        }

        impl restate_sdk::serde::WithContentType for $type {
            fn content_type() -> &'static str {
                "application/json"
            }
        }
    };
}

crate::impl_restate_serde!(IngestionRequest);
crate::impl_restate_serde!(IngestionSummary);
crate::impl_restate_serde!(NeighborQuery);
crate::impl_restate_serde!(NeighborResult);
