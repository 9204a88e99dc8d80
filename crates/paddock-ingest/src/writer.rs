//! Persistence writer: encode domain records and hand them to the store.

use paddock_core::{
  row::{Table, ToRow, to_rows},
  store::{ResultStore, WriteReport},
};
use tracing::{error, info};

use crate::{Error, Result};

/// Write `records` into `table`, insert-if-absent.
///
/// Every per-row failure is logged with its statement and values; the
/// batch itself only fails when the store does.
pub async fn write_records<S, T>(store: &S, table: Table, records: &[T]) -> Result<WriteReport>
where
  S: ResultStore,
  T: ToRow,
{
  let rows = to_rows(records)?;
  let report = store
    .insert_if_absent(table, rows)
    .await
    .map_err(Error::store)?;

  for failure in &report.failures {
    error!(
      %table,
      index = failure.index,
      statement = %failure.statement,
      values = ?failure.values,
      reason = %failure.reason,
      "failed to write record"
    );
  }
  info!(
    %table,
    inserted = report.inserted,
    already_present = report.already_present,
    failed = report.failures.len(),
    "wrote batch"
  );
  Ok(report)
}

// ─── Run summary ─────────────────────────────────────────────────────────────

/// Totals for one table across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTotals {
  pub inserted:        usize,
  pub already_present: usize,
  pub failed:          usize,
}

/// Every batch written during one run, in order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
  pub batches: Vec<WriteReport>,
}

impl RunReport {
  pub fn record(&mut self, report: WriteReport) { self.batches.push(report); }

  pub fn totals(&self, table: Table) -> TableTotals {
    self
      .batches
      .iter()
      .filter(|b| b.table == table)
      .fold(TableTotals::default(), |acc, b| TableTotals {
        inserted:        acc.inserted + b.inserted,
        already_present: acc.already_present + b.already_present,
        failed:          acc.failed + b.failures.len(),
      })
  }

  pub fn failed(&self) -> usize { self.batches.iter().map(|b| b.failures.len()).sum() }

  pub fn log_summary(&self) {
    for table in Table::ALL {
      let t = self.totals(table);
      info!(
        %table,
        inserted = t.inserted,
        already_present = t.already_present,
        failed = t.failed,
        "run summary"
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use paddock_core::model::Constructor;
  use paddock_store_sqlite::SqliteStore;

  use super::*;

  fn constructor(id: &str, name: &str) -> Constructor {
    Constructor { constructor_id: id.into(), constructor_name: name.into() }
  }

  #[tokio::test]
  async fn reports_accumulate_per_table() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.ensure_schema().await.unwrap();
    let teams = [constructor("FER", "Ferrari"), constructor("MCL", "McLaren")];

    let mut run = RunReport::default();
    run.record(write_records(&store, Table::Constructors, &teams).await.unwrap());
    run.record(write_records(&store, Table::Constructors, &teams).await.unwrap());

    assert_eq!(run.totals(Table::Constructors), TableTotals {
      inserted:        2,
      already_present: 2,
      failed:          0,
    });
    assert_eq!(run.totals(Table::Drivers), TableTotals::default());
    assert_eq!(run.failed(), 0);
  }
}
