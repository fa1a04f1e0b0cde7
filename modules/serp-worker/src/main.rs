use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use restate_sdk::prelude::*;
use tracing_subscriber::EnvFilter;

use serp_common::Config;
use serp_worker::service::{SerpActivities, SerpActivitiesImpl, WorkerDeps};
use serp_worker::{ConnectionManager, EnvConnector};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting serp-worker");

    let config = Config::from_env().context("Invalid worker configuration")?;
    config.log_redacted();

    let addr: SocketAddr = config
        .worker_addr
        .parse()
        .with_context(|| format!("Invalid WORKER_ADDR {:?}", config.worker_addr))?;

    // Stores are dialed on the first activity, not here.
    let connections = ConnectionManager::new(Arc::new(EnvConnector::new(config.clone())));
    let deps = Arc::new(WorkerDeps { connections });

    let mut builder = Endpoint::builder();
    if let Some(identity_key) = &config.restate_identity_key {
        tracing::info!("Restate identity key configured");
        builder = builder
            .identity_key(identity_key)
            .context("Invalid Restate identity key")?;
    }
    let endpoint = builder
        .bind(SerpActivitiesImpl::with_deps(deps).serve())
        .build();

    tracing::info!(%addr, "Activity endpoint listening");
    HttpServer::new(endpoint).listen_and_serve(addr).await;

    Ok(())
}
