//! Activity worker for SERP ingestion and page-link lookups.
//!
//! The orchestrator owns scheduling, retries and timeouts. This crate owns the
//! activities themselves and the lazily-connected store handles they share.

pub mod activities;
pub mod connections;
pub mod connector;
pub mod context;
pub mod error;
pub mod service;

pub use activities::{get_graph_neighbors, ingest_serp_data};
pub use connections::ConnectionManager;
pub use connector::EnvConnector;
pub use context::ActivityContext;
pub use error::ActivityError;
