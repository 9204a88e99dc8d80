//! Season spreadsheets → reference entities and session results.

use paddock_core::{
  model::{ResultRecord, SessionKind},
  resolve::Lookups,
  row::Table,
  store::ResultStore,
};
use paddock_sources::tabular::{LookupKind, result_observations, year_from_filename};
use tracing::{debug, info, warn};

use super::Ingest;
use crate::{Result, writer::{RunReport, write_records}};

impl<S: ResultStore> Ingest<'_, S> {
  pub(super) async fn run_files(&self, lookups: &Lookups, report: &mut RunReport) -> Result<()> {
    report.record(write_records(self.store, Table::Constructors, &lookups.constructors()).await?);
    report.record(write_records(self.store, Table::Drivers, &lookups.drivers()).await?);
    report.record(write_records(self.store, Table::Tracks, &lookups.tracks()).await?);

    let sessions = [
      (SessionKind::Qualifying, &self.config.qualifying_files),
      (SessionKind::Race, &self.config.race_files),
    ];
    for (session, filenames) in sessions {
      for filename in filenames {
        let Some(year) = year_from_filename(filename) else {
          warn!(filename, "no season in filename; skipping file");
          continue;
        };
        let records = self.resolve_file(lookups, filename, year, session).await?;
        report.record(write_records(self.store, session.table(), &records).await?);
      }
    }
    Ok(())
  }

  /// The three name → code tables, shared by both pipelines.
  pub(super) async fn load_lookups(&self) -> Result<Lookups> {
    let names = &self.config.lookups;
    let lookups = Lookups {
      drivers:      self.files.load_lookup(&names.drivers, LookupKind::Drivers).await?,
      constructors: self
        .files
        .load_lookup(&names.constructors, LookupKind::Constructors)
        .await?,
      tracks:       self.files.load_lookup(&names.tracks, LookupKind::Tracks).await?,
    };
    info!(
      drivers = lookups.drivers.len(),
      constructors = lookups.constructors.len(),
      tracks = lookups.tracks.len(),
      "lookup tables loaded"
    );
    Ok(lookups)
  }

  async fn resolve_file(
    &self,
    lookups: &Lookups,
    filename: &str,
    year: i32,
    session: SessionKind,
  ) -> Result<Vec<ResultRecord>> {
    let rows = self.files.read_rows(filename).await?;
    let observations = result_observations(&rows);
    if session == SessionKind::Race {
      for obs in &observations {
        if let Some(Err(cell)) = obs.grid_slot() {
          warn!(
            filename,
            driver = obs.driver.as_deref(),
            grid = cell,
            "starting grid is not a slot number; stored as NULL"
          );
        }
      }
    }
    let records: Vec<ResultRecord> = observations
      .iter()
      .filter_map(|obs| lookups.resolve_result(year, session, obs))
      .collect();

    let skipped = rows.len() - records.len();
    if skipped > 0 {
      debug!(filename, skipped, "rows without a position skipped");
    }
    Ok(records)
  }
}
