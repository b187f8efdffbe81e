// src/lib.rs
// Library surface for the `fetch-news` binary and integration tests.

pub mod ingest;
pub mod metrics;

pub use crate::ingest::config::IngestConfig;
pub use crate::ingest::{run_once, IngestReport};
