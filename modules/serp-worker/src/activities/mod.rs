//! The two activities the worker exposes.
//!
//! Each takes the shared `ConnectionManager` and the invocation's
//! `ActivityContext`, performs its I/O through the context, and returns either
//! a value or a classified `ActivityError`. Neither retries on its own.

pub mod ingest;
pub mod neighbors;
pub mod types;

pub use ingest::{build_rows, ingest_serp_data, RowBatch};
pub use neighbors::get_graph_neighbors;
pub use types::{IngestionRequest, IngestionSummary, NeighborQuery, NeighborResult};
