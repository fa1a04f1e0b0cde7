//! Append-only SERP result store backed by Postgres.
//!
//! One relation, `serp_results`, clustered for per-keyword time-range scans.
//! Rows are only ever appended in whole batches; nothing here updates or
//! deletes.

pub mod client;
pub mod migrate;
pub mod reader;
pub mod writer;

mod store;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::AnalyticsClient;
pub use reader::SerpResultReader;
pub use writer::SerpResultWriter;
