//! Flat-file boundary: workload ingestion and the report exports.

pub mod export;
pub mod ingest;
