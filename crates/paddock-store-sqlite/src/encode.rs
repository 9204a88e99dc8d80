//! Translation between storage-neutral rows and SQLite statements/values.

use paddock_core::row::{Table, Value};

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_value(value: &Value) -> rusqlite::types::Value {
  match value {
    Value::Null => rusqlite::types::Value::Null,
    Value::Integer(n) => rusqlite::types::Value::Integer(*n),
    Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// Build the insert-if-absent statement for `columns` of `table`.
///
/// The `NOT EXISTS` guard compares every column with `IS`, so NULLs match
/// NULLs and the full column set acts as the conflict key without a unique
/// index. `ON CONFLICT DO NOTHING` additionally skips primary-key
/// collisions. Other constraint violations (NOT NULL, CHECK) still fail.
pub fn insert_if_absent_sql(table: Table, columns: &[&str]) -> String {
  let names = columns.join(", ");
  let placeholders = (1..=columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  let matches = columns
    .iter()
    .enumerate()
    .map(|(i, column)| format!("{column} IS ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(" AND ");

  format!(
    "INSERT INTO {table} ({names}) SELECT {placeholders} \
     WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {matches}) \
     ON CONFLICT DO NOTHING"
  )
}
