//! CSV decoding for season-result and lookup files.
//!
//! Pure and synchronous; the remote fetch lives in [`crate::files`].

use paddock_core::model::{ResultObservation, TabularRow};

/// Column holding the code in every lookup file.
pub const CODE_COLUMN: &str = "Unique Code";

/// The three lookup files and their name columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
  Drivers,
  Constructors,
  Tracks,
}

impl LookupKind {
  pub fn name_column(self) -> &'static str {
    match self {
      Self::Drivers => "Driver Name",
      Self::Constructors => "Constructor Name",
      Self::Tracks => "Track Name",
    }
  }
}

/// Decode a CSV document with a header row into one map per record.
///
/// Short records are accepted; missing and empty cells are left out of the
/// row. Records with no non-empty cell are dropped. Cell text is kept
/// verbatim since names are matched exactly.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<TabularRow>, csv::Error> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .from_reader(bytes);
  let headers = reader.headers()?.clone();

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    let row: TabularRow = headers
      .iter()
      .zip(record.iter())
      .filter(|(_, cell)| !cell.is_empty())
      .map(|(header, cell)| (header.to_owned(), cell.to_owned()))
      .collect();
    if !row.is_empty() {
      rows.push(row);
    }
  }
  Ok(rows)
}

/// Pick the result columns out of season-result rows.
pub fn result_observations(rows: &[TabularRow]) -> Vec<ResultObservation> {
  rows
    .iter()
    .map(|row| ResultObservation {
      track:         row.get("Track").cloned(),
      driver:        row.get("Driver").cloned(),
      team:          row.get("Team").cloned(),
      position:      row.get("Position").cloned(),
      starting_grid: row.get("Starting Grid").cloned(),
    })
    .collect()
}

/// Extract the season from a file named like `Formula1_2023season_…`.
pub fn year_from_filename(filename: &str) -> Option<i32> {
  let (_, rest) = filename.split_once("Formula1_")?;
  let digits = rest.get(..4)?;
  if !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}
