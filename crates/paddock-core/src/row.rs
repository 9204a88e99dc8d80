//! Storage-neutral rows: an ordered list of column/value pairs bound for one
//! of the six pipeline tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Tables ──────────────────────────────────────────────────────────────────

/// The tables the pipeline writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Constructors,
  Drivers,
  Tracks,
  QualifyingResults,
  RaceResults,
  RaceResultsRaw,
}

impl Table {
  pub const ALL: [Table; 6] = [
    Self::Constructors,
    Self::Drivers,
    Self::Tracks,
    Self::QualifyingResults,
    Self::RaceResults,
    Self::RaceResultsRaw,
  ];

  /// The SQL table name.
  pub fn name(self) -> &'static str {
    match self {
      Self::Constructors => "constructors",
      Self::Drivers => "drivers",
      Self::Tracks => "tracks",
      Self::QualifyingResults => "qualifying_results",
      Self::RaceResults => "race_results",
      Self::RaceResultsRaw => "race_results_raw",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Text(String),
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self { Self::Integer(n.into()) }
}

impl From<u32> for Value {
  fn from(n: u32) -> Self { Self::Integer(n.into()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// An ordered set of named column values.
///
/// Column names are `'static` so they can only come from code, never from
/// upstream data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
  columns: Vec<(&'static str, Value)>,
}

impl Row {
  pub fn new() -> Self { Self::default() }

  /// Append a column. Builder-style.
  pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
    self.columns.push((column, value.into()));
    self
  }

  pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.columns.iter().map(|(c, _)| *c)
  }

  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.columns.iter().map(|(_, v)| v)
  }

  pub fn get(&self, column: &str) -> Option<&Value> {
    self
      .columns
      .iter()
      .find(|(c, _)| *c == column)
      .map(|(_, v)| v)
  }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// True when both rows carry the same columns in the same order.
  pub fn same_shape(&self, other: &Row) -> bool {
    self.columns().eq(other.columns())
  }
}

/// Conversion of a domain record into a storage row.
pub trait ToRow {
  fn to_row(&self) -> Result<Row>;
}

/// Encode a batch of records, failing on the first one that cannot be
/// serialized.
pub fn to_rows<'a, T: ToRow + 'a>(
  records: impl IntoIterator<Item = &'a T>,
) -> Result<Vec<Row>> {
  records.into_iter().map(ToRow::to_row).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn optional_values_become_null() {
    let row = Row::new()
      .with("a", Some("x"))
      .with("b", None::<i64>)
      .with("c", 7_i32);

    assert_eq!(row.get("a"), Some(&Value::Text("x".into())));
    assert_eq!(row.get("b"), Some(&Value::Null));
    assert_eq!(row.get("c"), Some(&Value::Integer(7)));
    assert_eq!(row.get("d"), None);
  }

  #[test]
  fn shape_depends_on_column_order() {
    let ab = Row::new().with("a", 1_i64).with("b", 2_i64);
    let ab2 = Row::new().with("a", 3_i64).with("b", 4_i64);
    let ba = Row::new().with("b", 2_i64).with("a", 1_i64);
    let a = Row::new().with("a", 1_i64);

    assert!(ab.same_shape(&ab2));
    assert!(!ab.same_shape(&ba));
    assert!(!ab.same_shape(&a));
  }
}
