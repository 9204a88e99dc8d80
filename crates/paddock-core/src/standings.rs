//! Position merger: folds a session's position time-series into terminal
//! standings and annotates them with constructor affiliation.
//!
//! Standings are keyed by rank rather than stored as a dense array, so a gap
//! (a driver who did not start or finish) never shifts the entries after it.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::resolve::Roster;

// ─── Input ───────────────────────────────────────────────────────────────────

/// One sample of a driver's running position within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
  pub driver_number: u32,
  pub position:      u32,
  /// When the sample was taken, if upstream reports it.
  pub date:          Option<DateTime<Utc>>,
}

/// Total order over updates: timestamp first, then arrival index. Updates
/// without a timestamp sort before timestamped ones.
type OrderKey = (Option<DateTime<Utc>>, usize);

// ─── Standings ───────────────────────────────────────────────────────────────

/// A rank → entry map with 1-based ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings<T> {
  by_rank: BTreeMap<u32, T>,
}

impl<T> Default for Standings<T> {
  fn default() -> Self { Self { by_rank: BTreeMap::new() } }
}

impl<T> Standings<T> {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, rank: u32) -> Option<&T> { self.by_rank.get(&rank) }

  pub fn len(&self) -> usize { self.by_rank.len() }

  pub fn is_empty(&self) -> bool { self.by_rank.is_empty() }

  /// Entries in rank order.
  pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
    self.by_rank.iter().map(|(rank, entry)| (*rank, entry))
  }

  /// Place `entry` at `rank`, returning the entry it displaced, if any.
  pub fn place(&mut self, rank: u32, entry: T) -> Option<T> {
    self.by_rank.insert(rank, entry)
  }

  pub fn map<U>(&self, mut f: impl FnMut(u32, &T) -> U) -> Standings<U> {
    Standings {
      by_rank: self
        .by_rank
        .iter()
        .map(|(rank, entry)| (*rank, f(*rank, entry)))
        .collect(),
    }
  }
}

/// Serialized as a JSON array in rank order; the rank lives inside each
/// entry, so gaps never appear as `null` holes.
impl<T: Serialize> Serialize for Standings<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.by_rank.values())
  }
}

/// A placed driver annotated with their constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub position:       u32,
  pub driver_id:      String,
  pub constructor_id: String,
}

// ─── Fold ────────────────────────────────────────────────────────────────────

/// The result of reducing a position stream to one entry per driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalFold {
  /// Driver numbers keyed by terminal rank.
  pub standings: Standings<u32>,
  /// Drivers whose terminal rank was taken by a newer update from another
  /// driver.
  pub displaced: Vec<u32>,
  /// Drivers whose terminal position was 0, which is not a valid rank.
  pub rejected:  Vec<u32>,
}

/// Reduce `updates` to each driver's terminal position.
///
/// The update with the greatest [`OrderKey`] wins per driver, so the result
/// does not depend on arrival order whenever upstream supplies timestamps.
/// Folding a stream concatenated with itself yields the same standings.
pub fn fold_terminal(updates: &[PositionUpdate]) -> TerminalFold {
  let mut latest: HashMap<u32, (OrderKey, u32)> = HashMap::new();

  for (arrival, update) in updates.iter().enumerate() {
    let key = (update.date, arrival);
    let slot = latest
      .entry(update.driver_number)
      .or_insert((key, update.position));
    if key > slot.0 {
      *slot = (key, update.position);
    }
  }

  let mut terminal: Vec<(OrderKey, u32, u32)> = latest
    .into_iter()
    .map(|(driver, (key, position))| (key, driver, position))
    .collect();
  terminal.sort_unstable();

  let mut fold = TerminalFold::default();
  for (_, driver, position) in terminal {
    if position == 0 {
      fold.rejected.push(driver);
    } else if let Some(previous) = fold.standings.place(position, driver) {
      fold.displaced.push(previous);
    }
  }
  fold
}

/// Annotate terminal standings with each driver's id and constructor.
///
/// A driver number the roster has no row for is placed as [`UNKNOWN`],
/// like an unmapped team.
///
/// [`UNKNOWN`]: crate::UNKNOWN
pub fn merge(terminal: &Standings<u32>, roster: &Roster) -> Standings<Placement> {
  terminal.map(|position, driver| Placement {
    position,
    driver_id: roster.driver_of(*driver).to_owned(),
    constructor_id: roster.constructor_of(*driver).to_owned(),
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    UNKNOWN,
    model::{Driver, DriverObservation},
    resolve::LookupTable,
  };

  fn update(driver_number: u32, position: u32) -> PositionUpdate {
    PositionUpdate { driver_number, position, date: None }
  }

  fn at(driver_number: u32, position: u32, secs: i64) -> PositionUpdate {
    PositionUpdate {
      driver_number,
      position,
      date: Some(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()),
    }
  }

  #[test]
  fn later_update_replaces_earlier_rank() {
    let fold = fold_terminal(&[update(1, 1), update(1, 3)]);

    assert_eq!(fold.standings.len(), 1);
    assert_eq!(fold.standings.get(3), Some(&1));
    assert_eq!(fold.standings.get(1), None);
  }

  #[test]
  fn gaps_do_not_shift_entries() {
    let fold = fold_terminal(&[update(44, 1), update(16, 4)]);

    let ranks: Vec<_> = fold.standings.iter().collect();
    assert_eq!(ranks, [(1, &44), (4, &16)]);
  }

  #[test]
  fn fold_is_idempotent_under_reapplication() {
    let stream = vec![
      update(1, 2),
      update(11, 1),
      update(1, 1),
      update(11, 2),
      update(55, 3),
    ];
    let doubled: Vec<_> = stream.iter().chain(stream.iter()).cloned().collect();

    let once = fold_terminal(&stream);
    let twice = fold_terminal(&doubled);
    assert_eq!(once.standings, twice.standings);
    assert_eq!(fold_terminal(&stream), once);
  }

  #[test]
  fn timestamps_beat_arrival_order() {
    // The final sample arrives first.
    let fold = fold_terminal(&[at(1, 5, 30), at(1, 2, 10), at(1, 4, 20)]);
    assert_eq!(fold.standings.get(5), Some(&1));
    assert_eq!(fold.standings.len(), 1);
  }

  #[test]
  fn newer_update_keeps_a_contested_rank() {
    let fold = fold_terminal(&[at(1, 2, 10), at(16, 2, 20)]);

    assert_eq!(fold.standings.get(2), Some(&16));
    assert_eq!(fold.displaced, [1]);
  }

  #[test]
  fn zero_position_is_rejected() {
    let fold = fold_terminal(&[update(1, 0), update(4, 1)]);

    assert_eq!(fold.rejected, [1]);
    assert_eq!(fold.standings.get(1), Some(&4));
  }

  #[test]
  fn merge_attaches_constructors() {
    let observation = DriverObservation {
      driver_number: 1,
      full_name:     Some("Max Verstappen".into()),
      team_name:     Some("Red Bull Racing".into()),
      country_code:  Some("NED".into()),
    };
    let roster = Roster::from_observations([observation], &LookupTable::new());
    let fold = fold_terminal(&[update(1, 1), update(99, 2)]);

    let merged = merge(&fold.standings, &roster);
    let red_bull = roster.constructors().get("Red Bull Racing").unwrap();

    assert_eq!(merged.get(1).unwrap().constructor_id, red_bull);
    assert_eq!(merged.get(1).unwrap().driver_id, "1");
    assert_eq!(merged.get(2).unwrap().constructor_id, UNKNOWN);
    assert_eq!(merged.get(2).unwrap().driver_id, UNKNOWN);
    assert_eq!(merged.get(2).unwrap().position, 2);
  }

  #[test]
  fn unmapped_team_resolves_to_sentinel() {
    let team_of = HashMap::from([(7, "Unknown Racing".to_owned())]);
    let drivers = vec![Driver {
      driver_id:    "7".into(),
      driver_name:  "Nyck de Vries".into(),
      team_name:    Some("Unknown Racing".into()),
      country_code: None,
    }];
    let roster = Roster::from_parts(team_of, LookupTable::new(), drivers);
    let fold = fold_terminal(&[update(7, 1)]);

    let merged = merge(&fold.standings, &roster);
    assert_eq!(merged.get(1).unwrap().constructor_id, UNKNOWN);
    assert_eq!(merged.get(1).unwrap().driver_id, "7");
  }

  #[test]
  fn serializes_as_rank_ordered_array() {
    let mut standings = Standings::new();
    standings.place(3, Placement {
      position:       3,
      driver_id:      "16".into(),
      constructor_id: "abc".into(),
    });
    standings.place(1, Placement {
      position:       1,
      driver_id:      "1".into(),
      constructor_id: "def".into(),
    });

    let json = serde_json::to_value(&standings).unwrap();
    assert_eq!(
      json,
      serde_json::json!([
        { "position": 1, "driver_id": "1",  "constructor_id": "def" },
        { "position": 3, "driver_id": "16", "constructor_id": "abc" },
      ])
    );
  }
}
