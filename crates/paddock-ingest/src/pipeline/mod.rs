//! The ingest run: the file pipeline followed by the session API pipeline.

mod api;
mod files;

use paddock_core::store::ResultStore;
use paddock_sources::{FileStore, OpenF1Client};
use tracing::info;

use crate::{Result, config::IngestConfig, writer::RunReport};

/// One ingest run against an injected store.
pub struct Ingest<'a, S> {
  store:  &'a S,
  files:  FileStore,
  api:    OpenF1Client,
  config: &'a IngestConfig,
}

impl<'a, S: ResultStore> Ingest<'a, S> {
  pub fn new(store: &'a S, config: &'a IngestConfig) -> Result<Self> {
    let timeout = config.http_timeout();
    Ok(Self {
      store,
      files: FileStore::new(&config.files_base_url, timeout)?,
      api: OpenF1Client::new(&config.api_base_url, timeout)?,
      config,
    })
  }

  /// Run both pipelines to completion. The schema must already exist.
  ///
  /// Stops at the first unexpected failure; rows written before it stay
  /// written.
  pub async fn run(&self) -> Result<RunReport> {
    let mut report = RunReport::default();

    let lookups = self.load_lookups().await?;

    info!("file pipeline starting");
    self.run_files(&lookups, &mut report).await?;

    info!(years = ?self.config.api_years, "session API pipeline starting");
    for &year in &self.config.api_years {
      self.run_api_season(year, &lookups, &mut report).await?;
    }

    report.log_summary();
    Ok(report)
  }
}
