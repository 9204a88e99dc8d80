//! The SQLite implementation of [`ResultStore`].

use std::path::Path;

use paddock_core::{
  UNKNOWN,
  row::{Row, Table},
  store::{ResultStore, WriteFailure, WriteReport},
};

use crate::{
  Result,
  encode::{encode_value, insert_if_absent_sql},
  schema::{SCHEMA, SENTINEL_TABLES},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A results store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`. The schema is not touched; call
  /// [`ResultStore::ensure_schema`] once the store is reachable.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Execute one prepared insert. The inner result carries a per-row
  /// failure; the outer one a lost connection.
  async fn insert_one(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Result<usize, String>> {
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .execute(&sql, rusqlite::params_from_iter(params))
            .map_err(|e| e.to_string()),
        )
      })
      .await?;
    Ok(outcome)
  }
}

// ─── ResultStore impl ────────────────────────────────────────────────────────

impl ResultStore for SqliteStore {
  type Error = crate::Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        for (table, id_column, name_column) in SENTINEL_TABLES {
          conn.execute(
            &format!(
              "INSERT INTO {table} ({id_column}, {name_column}) VALUES (?1, ?1)
               ON CONFLICT DO NOTHING"
            ),
            rusqlite::params![UNKNOWN],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_if_absent(&self, table: Table, rows: Vec<Row>) -> Result<WriteReport> {
    let mut report = WriteReport::new(table);
    let Some(first) = rows.first() else {
      return Ok(report);
    };

    let columns: Vec<&str> = first.columns().collect();
    let sql = insert_if_absent_sql(table, &columns);

    for (index, row) in rows.iter().enumerate() {
      let values: Vec<_> = row.values().cloned().collect();

      if row.is_empty() || !row.same_shape(first) {
        report.failures.push(WriteFailure {
          index,
          statement: sql.clone(),
          values,
          reason: format!(
            "row columns ({}) do not match batch columns ({})",
            row.columns().collect::<Vec<_>>().join(", "),
            columns.join(", "),
          ),
        });
        continue;
      }

      let params = row.values().map(encode_value).collect();
      match self.insert_one(sql.clone(), params).await? {
        Ok(0) => report.already_present += 1,
        Ok(_) => report.inserted += 1,
        Err(reason) => report.failures.push(WriteFailure {
          index,
          statement: sql.clone(),
          values,
          reason,
        }),
      }
    }

    Ok(report)
  }

  async fn count(&self, table: Table) -> Result<u64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
          row.get::<_, i64>(0)
        })?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}
