//! Error types for the ingest orchestrator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store not reachable after {attempts} attempts: {last}")]
  StoreUnavailable { attempts: u32, last: String },
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("source error: {0}")]
  Source(#[from] paddock_sources::Error),
  #[error("encoding error: {0}")]
  Encode(#[from] paddock_core::Error),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
