pub mod client;
pub mod reader;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::{GraphClient, GraphConnectError};
pub use reader::NeighborReader;

// Re-export for tests and callers that seed the graph
pub use neo4rs::query;
