//! Domain model: the entities persisted by the pipeline and the unresolved
//! observations they are built from.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  row::{Row, Table, ToRow},
  standings::{Placement, Standings},
};

/// Placeholder reference substituted whenever a name cannot be resolved.
///
/// The store seeds one entity row with this id in each reference table, so a
/// sentinel reference still points at an existing entity.
pub const UNKNOWN: &str = "UNKNOWN";

/// One parsed spreadsheet row: column header → cell text. Empty cells are
/// absent rather than present-and-empty.
pub type TabularRow = HashMap<String, String>;

// ─── Reference entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
  pub constructor_id:   String,
  pub constructor_name: String,
}

/// A driver as seen in one season snapshot. Team affiliation is not a
/// cross-season identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
  pub driver_id:    String,
  pub driver_name:  String,
  pub team_name:    Option<String>,
  pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
  pub track_id:     String,
  pub track_name:   String,
  pub circuit_key:  Option<String>,
  pub country_name: Option<String>,
  pub location:     Option<String>,
}

// ─── Sessions and results ────────────────────────────────────────────────────

/// The two sessions of a meeting that the pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
  Qualifying,
  Race,
}

impl SessionKind {
  /// The label upstream sessions carry, e.g. `"Qualifying"`.
  pub fn label(self) -> &'static str {
    match self {
      Self::Qualifying => "Qualifying",
      Self::Race => "Race",
    }
  }

  /// The normalized results table for this session.
  pub fn table(self) -> Table {
    match self {
      Self::Qualifying => Table::QualifyingResults,
      Self::Race => Table::RaceResults,
    }
  }
}

/// A finishing (or qualifying) position as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finish {
  /// 1-based classified rank.
  Classified(u32),
  /// Non-numeric marker such as `NC`, `DQ` or `DNS`.
  Unclassified(String),
}

impl Finish {
  /// Interpret a position cell. Returns `None` for a blank cell.
  pub fn parse(cell: &str) -> Option<Self> {
    let cell = cell.trim();
    if cell.is_empty() {
      return None;
    }
    match cell.parse::<u32>() {
      Ok(rank) if rank > 0 => Some(Self::Classified(rank)),
      _ => Some(Self::Unclassified(cell.to_owned())),
    }
  }

  pub fn rank(&self) -> Option<u32> {
    match self {
      Self::Classified(rank) => Some(*rank),
      Self::Unclassified(_) => None,
    }
  }
}

impl fmt::Display for Finish {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Classified(rank) => write!(f, "{rank}"),
      Self::Unclassified(marker) => f.write_str(marker),
    }
  }
}

/// One spreadsheet result row before name resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultObservation {
  pub track:         Option<String>,
  pub driver:        Option<String>,
  pub team:          Option<String>,
  pub position:      Option<String>,
  pub starting_grid: Option<String>,
}

impl ResultObservation {
  /// The starting grid slot. `Err` carries a cell that is not a slot
  /// number, such as `Pit Lane`.
  pub fn grid_slot(&self) -> Option<Result<i64, &str>> {
    let cell = self.starting_grid.as_deref()?.trim();
    if cell.is_empty() {
      return None;
    }
    Some(cell.parse().map_err(|_| cell))
  }
}

/// A resolved qualifying or race result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
  pub session:          SessionKind,
  pub year:             i32,
  pub track_code:       String,
  pub driver_code:      String,
  pub constructor_code: String,
  pub position:         Finish,
  /// Race only; always `None` for qualifying.
  pub starting_grid:    Option<i64>,
}

// ─── API observations ────────────────────────────────────────────────────────

/// A driver record as observed on the session API for one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverObservation {
  pub driver_number: u32,
  pub full_name:     Option<String>,
  pub team_name:     Option<String>,
  pub country_code:  Option<String>,
}

/// The archival, denormalized record of one meeting's merged standings.
#[derive(Debug, Clone)]
pub struct RawSessionSnapshot {
  pub meeting_key:     String,
  pub circuit_key:     String,
  pub date:            String,
  pub year:            i32,
  pub quali_positions: Standings<Placement>,
  pub race_positions:  Standings<Placement>,
}

// ─── Row encoding ────────────────────────────────────────────────────────────

impl ToRow for Constructor {
  fn to_row(&self) -> Result<Row> {
    Ok(
      Row::new()
        .with("constructor_id", self.constructor_id.as_str())
        .with("constructor_name", self.constructor_name.as_str()),
    )
  }
}

impl ToRow for Driver {
  fn to_row(&self) -> Result<Row> {
    Ok(
      Row::new()
        .with("driver_id", self.driver_id.as_str())
        .with("driver_name", self.driver_name.as_str())
        .with("team_name", self.team_name.as_deref())
        .with("country_code", self.country_code.as_deref()),
    )
  }
}

impl ToRow for Track {
  fn to_row(&self) -> Result<Row> {
    Ok(
      Row::new()
        .with("track_id", self.track_id.as_str())
        .with("track_name", self.track_name.as_str())
        .with("circuit_key", self.circuit_key.as_deref())
        .with("country_name", self.country_name.as_deref())
        .with("location", self.location.as_deref()),
    )
  }
}

impl ToRow for ResultRecord {
  fn to_row(&self) -> Result<Row> {
    let row = Row::new()
      .with("year", self.year)
      .with("track_code", self.track_code.as_str())
      .with("driver_code", self.driver_code.as_str())
      .with("constructor_code", self.constructor_code.as_str())
      .with("position", self.position.to_string());
    Ok(match self.session {
      SessionKind::Qualifying => row,
      SessionKind::Race => row.with("starting_grid", self.starting_grid),
    })
  }
}

impl ToRow for RawSessionSnapshot {
  fn to_row(&self) -> Result<Row> {
    Ok(
      Row::new()
        .with("meeting_key", self.meeting_key.as_str())
        .with("circuit_key", self.circuit_key.as_str())
        .with("date", self.date.as_str())
        .with("year", self.year)
        .with("quali_positions", serde_json::to_string(&self.quali_positions)?)
        .with("race_positions", serde_json::to_string(&self.race_positions)?),
    )
  }
}
