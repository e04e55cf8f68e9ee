//! Service layer
//!
//! Services connect the alert engine to its inputs.

pub mod ingest;

pub use ingest::{IngestService, IngestSummary, SnapshotRecord};
