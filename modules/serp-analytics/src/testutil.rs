//! Test utilities for spinning up a real Postgres instance via testcontainers.

use std::time::Duration;

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use serp_common::Config;

use crate::AnalyticsClient;

/// Spin up a Postgres container and return the container handle + connected AnalyticsClient.
///
/// The container is dropped (and stopped) when `ContainerAsync` goes out of scope,
/// so callers must hold it alive for the duration of the test.
pub async fn postgres_container() -> (ContainerAsync<GenericImage>, AnalyticsClient) {
    let image = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_USER", "default")
        .with_env_var("POSTGRES_PASSWORD", "test")
        .with_env_var("POSTGRES_DB", "default");

    let container: ContainerAsync<GenericImage> = image
        .start()
        .await
        .expect("Failed to start Postgres container");

    let host_port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get Postgres host port");

    let config = Config::builder()
        .analytics_addr(format!("127.0.0.1:{host_port}"))
        .analytics_password("test")
        .connect_timeout(Duration::from_secs(5))
        .build();

    // The image restarts once after initdb; the first ready line can be early.
    let mut attempts = 0;
    let client = loop {
        match AnalyticsClient::connect(&config).await {
            Ok(client) => break client,
            Err(e) if attempts < 30 => {
                attempts += 1;
                tracing::debug!(error = %e, attempts, "Postgres not ready yet");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => panic!("Failed to connect to Postgres: {e}"),
        }
    };

    (container, client)
}
