//! Test utilities for spinning up a real Neo4j instance via testcontainers.

use std::time::Duration;

use neo4rs::query;
use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use crate::GraphClient;

/// Spin up a Neo4j container and return the container handle + connected GraphClient.
///
/// The container is dropped (and stopped) when `ContainerAsync` goes out of scope,
/// so callers must hold it alive for the duration of the test.
pub async fn neo4j_container() -> (ContainerAsync<GenericImage>, GraphClient) {
    let image = GenericImage::new("neo4j", "5.25.1-community")
        .with_exposed_port(ContainerPort::Tcp(7687))
        .with_wait_for(WaitFor::message_on_stdout("Started."))
        .with_env_var("NEO4J_AUTH", "neo4j/testpassword");

    let container: ContainerAsync<GenericImage> = image
        .start()
        .await
        .expect("Failed to start Neo4j container");

    let host_port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("Failed to get Neo4j host port");

    let uri = format!("bolt://127.0.0.1:{host_port}");
    let client = GraphClient::connect(&uri, "neo4j", "testpassword", Duration::from_secs(30))
        .await
        .expect("Failed to connect to Neo4j");

    (container, client)
}

/// Create a `Page` for `from` linking to one new `Page` per target, in order.
pub async fn seed_links(client: &GraphClient, from: &str, targets: &[String]) {
    client
        .inner()
        .run(query("MERGE (:Page {url: $url})").param("url", from))
        .await
        .expect("Failed to create page");

    for target in targets {
        client
            .inner()
            .run(
                query(
                    "MATCH (p:Page {url: $from})
                     MERGE (n:Page {url: $to})
                     CREATE (p)-[:LINKS_TO]->(n)",
                )
                .param("from", from)
                .param("to", target.as_str()),
            )
            .await
            .expect("Failed to create link");
    }
}
