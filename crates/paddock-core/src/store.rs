//! The `ResultStore` trait and the write report it returns.
//!
//! The trait is implemented by storage backends (e.g. `paddock-store-sqlite`).
//! The ingest pipeline depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::Serialize;

use crate::row::{Row, Table, Value};

// ─── Write report ────────────────────────────────────────────────────────────

/// A row that could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
  /// Position of the row within the submitted batch.
  pub index:     usize,
  /// The statement that failed (or would have been issued).
  pub statement: String,
  pub values:    Vec<Value>,
  pub reason:    String,
}

/// Outcome of one [`ResultStore::insert_if_absent`] batch.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
  pub table:           Table,
  /// Rows newly written.
  pub inserted:        usize,
  /// Rows skipped because an identical row (or primary key) already existed.
  pub already_present: usize,
  pub failures:        Vec<WriteFailure>,
}

impl WriteReport {
  pub fn new(table: Table) -> Self {
    Self { table, inserted: 0, already_present: 0, failures: Vec::new() }
  }

  /// Number of rows submitted.
  pub fn attempted(&self) -> usize {
    self.inserted + self.already_present + self.failures.len()
  }

  pub fn is_clean(&self) -> bool { self.failures.is_empty() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a relational results store.
///
/// Writes are insert-if-absent: the full column set of each row is its
/// conflict key, and an existing identical row is skipped rather than
/// overwritten. Each row is written independently; there is no batch-wide
/// transaction.
pub trait ResultStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cheap round-trip proving the store is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create the six pipeline tables if missing and seed the sentinel
  /// entities. Safe to call repeatedly.
  fn ensure_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write each row of `rows` into `table` unless an identical row exists.
  ///
  /// Column order is taken from the first row. Per-row failures (constraint
  /// violations, rows shaped differently from the first) are collected in
  /// the report; `Err` is reserved for losing the store itself.
  fn insert_if_absent(
    &self,
    table: Table,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<WriteReport, Self::Error>> + Send + '_;

  /// Number of rows currently in `table`.
  fn count(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
