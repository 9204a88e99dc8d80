//! Ingest orchestrator for Paddock.
//!
//! Drives one run end to end: season spreadsheets and the session API are
//! fetched, resolved and merged, then written insert-if-absent into any
//! [`ResultStore`](paddock_core::store::ResultStore).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod readiness;
pub mod writer;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use pipeline::Ingest;
pub use readiness::wait_for_store;
pub use writer::{RunReport, TableTotals};

// ─── Integration tests ────────────────────────────────────────────────────────
