//! Entity resolution: free-text names → stable identifiers.
//!
//! Two strategies coexist. Spreadsheet data resolves through externally
//! maintained lookup tables ([`LookupTable`], [`Lookups`]). Session API data
//! has no upstream identity for teams or circuits, so those ids are derived
//! from the name itself ([`SurrogateIds`]). Neither strategy ever fails:
//! an unknown name resolves to [`UNKNOWN`].

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::{
  UNKNOWN,
  model::{
    Constructor, Driver, DriverObservation, Finish, ResultObservation,
    ResultRecord, SessionKind, TabularRow, Track,
  },
};

// ─── Lookup tables ───────────────────────────────────────────────────────────

/// An exact-match name → code table. Matching is case- and
/// whitespace-sensitive.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
  /// `(name, code)` in first-seen order of the name.
  entries: Vec<(String, String)>,
  index:   HashMap<String, usize>,
}

impl LookupTable {
  pub fn new() -> Self { Self::default() }

  /// Build a table from spreadsheet rows. Rows missing either cell are
  /// skipped.
  pub fn from_rows<'a>(
    rows: impl IntoIterator<Item = &'a TabularRow>,
    name_column: &str,
    code_column: &str,
  ) -> Self {
    let mut table = Self::new();
    for row in rows {
      if let (Some(name), Some(code)) = (row.get(name_column), row.get(code_column)) {
        table.insert(name.as_str(), code.as_str());
      }
    }
    table
  }

  /// Map `name` to `code`. A repeated name keeps its position but takes the
  /// newer code.
  pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
    let name = name.into();
    let code = code.into();
    match self.index.get(&name) {
      Some(&i) => self.entries[i].1 = code,
      None => {
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, code));
      }
    }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.index.get(name).map(|&i| self.entries[i].1.as_str())
  }

  /// The code for `name`, or [`UNKNOWN`].
  pub fn resolve(&self, name: &str) -> &str { self.get(name).unwrap_or(UNKNOWN) }

  /// `(name, code)` pairs in first-seen order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for LookupTable {
  fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
    let mut table = Self::new();
    for (name, code) in iter {
      table.insert(name, code);
    }
    table
  }
}

/// The three lookup tables used to resolve spreadsheet results.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
  pub drivers:      LookupTable,
  pub constructors: LookupTable,
  pub tracks:       LookupTable,
}

impl Lookups {
  /// Resolve one spreadsheet row. Rows without a position carry no result
  /// and yield `None`; every missing or unknown name becomes [`UNKNOWN`].
  pub fn resolve_result(
    &self,
    year: i32,
    session: SessionKind,
    observation: &ResultObservation,
  ) -> Option<ResultRecord> {
    let position = Finish::parse(observation.position.as_deref()?)?;
    let code = |table: &LookupTable, name: &Option<String>| {
      name.as_deref().map_or(UNKNOWN, |n| table.resolve(n)).to_owned()
    };
    let starting_grid = match session {
      SessionKind::Qualifying => None,
      SessionKind::Race => observation.grid_slot().and_then(|slot| slot.ok()),
    };

    Some(ResultRecord {
      session,
      year,
      track_code: code(&self.tracks, &observation.track),
      driver_code: code(&self.drivers, &observation.driver),
      constructor_code: code(&self.constructors, &observation.team),
      position,
      starting_grid,
    })
  }

  pub fn constructors(&self) -> Vec<Constructor> {
    self
      .constructors
      .iter()
      .map(|(name, code)| Constructor {
        constructor_id:   code.to_owned(),
        constructor_name: name.to_owned(),
      })
      .collect()
  }

  pub fn drivers(&self) -> Vec<Driver> {
    self
      .drivers
      .iter()
      .map(|(name, code)| Driver {
        driver_id:    code.to_owned(),
        driver_name:  name.to_owned(),
        team_name:    None,
        country_code: None,
      })
      .collect()
  }

  pub fn tracks(&self) -> Vec<Track> {
    self
      .tracks
      .iter()
      .map(|(name, code)| Track {
        track_id:     code.to_owned(),
        track_name:   name.to_owned(),
        circuit_key:  None,
        country_name: None,
        location:     None,
      })
      .collect()
  }
}

// ─── Surrogate ids ───────────────────────────────────────────────────────────

/// Hex digits of the name digest used as the id.
const ID_LEN: usize = 12;

/// Content-addressed id of `name`: the leading hex digits of its SHA-256.
pub fn content_id(name: &str) -> String {
  let mut id = hex::encode(Sha256::digest(name.as_bytes()));
  id.truncate(ID_LEN);
  id
}

/// Synthesized ids for names that have no upstream identity.
///
/// Ids are derived from the name, not from the order names are observed, so
/// they are reproducible across calls and runs. If two distinct names share
/// a digest prefix, the later one gets a longer prefix.
#[derive(Debug, Clone, Default)]
pub struct SurrogateIds {
  ids:   HashMap<String, String>,
  names: HashMap<String, String>,
  order: Vec<String>,
}

impl SurrogateIds {
  pub fn new() -> Self { Self::default() }

  /// The id for `name`, assigning one on first observation.
  pub fn assign(&mut self, name: &str) -> &str {
    if !self.ids.contains_key(name) {
      let digest = hex::encode(Sha256::digest(name.as_bytes()));
      let mut len = ID_LEN;
      while len < digest.len() && self.names.contains_key(&digest[..len]) {
        len += 4;
      }
      let id = digest[..len].to_owned();
      self.names.insert(id.clone(), name.to_owned());
      self.ids.insert(name.to_owned(), id);
      self.order.push(name.to_owned());
    }
    &self.ids[name]
  }

  pub fn get(&self, name: &str) -> Option<&str> { self.ids.get(name).map(String::as_str) }

  /// The id for `name`, or [`UNKNOWN`] if it was never observed.
  pub fn resolve(&self, name: &str) -> &str { self.get(name).unwrap_or(UNKNOWN) }

  /// `(name, id)` pairs in first-seen order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .order
      .iter()
      .map(|name| (name.as_str(), self.ids[name].as_str()))
  }

  pub fn len(&self) -> usize { self.order.len() }

  pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

// ─── Season roster ───────────────────────────────────────────────────────────

/// The drivers and constructors of one season as observed on the session
/// API. Constructor identity is derived through each driver's team name:
/// a team listed in the constructor lookup takes its code, any other team
/// gets a [`SurrogateIds`] id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
  team_of:      HashMap<u32, String>,
  /// Team name → constructor id, in first-seen order.
  constructors: LookupTable,
  drivers:      Vec<Driver>,
  slots:        HashMap<u32, usize>,
}

fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

impl Roster {
  /// Build a roster from driver records in upstream order.
  ///
  /// A driver number seen more than once keeps its latest record. A record
  /// without a team (or country) leaves the driver's previous one in place,
  /// so the driver row always names the team its constructor id came from.
  pub fn from_observations(
    observations: impl IntoIterator<Item = DriverObservation>,
    known_constructors: &LookupTable,
  ) -> Self {
    let mut roster = Self::default();
    let mut surrogates = SurrogateIds::new();

    for obs in observations {
      let number = obs.driver_number;
      if let Some(team) = present(obs.team_name) {
        if roster.constructors.get(&team).is_none() {
          let id = match known_constructors.get(&team) {
            Some(code) => code,
            None => surrogates.assign(&team),
          };
          roster.constructors.insert(team.as_str(), id);
        }
        roster.team_of.insert(number, team);
      }

      let Some(driver_name) = present(obs.full_name) else {
        continue;
      };
      let mut driver = Driver {
        driver_id: number.to_string(),
        driver_name,
        team_name: roster.team_of.get(&number).cloned(),
        country_code: present(obs.country_code),
      };
      match roster.slots.get(&number) {
        Some(&i) => {
          let previous = &mut roster.drivers[i];
          driver.country_code = driver.country_code.or_else(|| previous.country_code.take());
          *previous = driver;
        }
        None => {
          roster.slots.insert(number, roster.drivers.len());
          roster.drivers.push(driver);
        }
      }
    }
    roster
  }

  pub fn from_parts(
    team_of: HashMap<u32, String>,
    constructors: LookupTable,
    drivers: Vec<Driver>,
  ) -> Self {
    let slots = drivers
      .iter()
      .enumerate()
      .filter_map(|(i, d)| d.driver_id.parse().ok().map(|number| (number, i)))
      .collect();
    Self { team_of, constructors, drivers, slots }
  }

  /// The driver id of `driver_number`, or [`UNKNOWN`] when the season has
  /// no driver row for it.
  pub fn driver_of(&self, driver_number: u32) -> &str {
    self
      .slots
      .get(&driver_number)
      .map_or(UNKNOWN, |&i| self.drivers[i].driver_id.as_str())
  }

  /// The constructor id of `driver_number`'s team, or [`UNKNOWN`].
  pub fn constructor_of(&self, driver_number: u32) -> &str {
    self
      .team_of
      .get(&driver_number)
      .map_or(UNKNOWN, |team| self.constructors.resolve(team))
  }

  /// Team name → constructor id.
  pub fn constructors(&self) -> &LookupTable { &self.constructors }

  pub fn constructor_rows(&self) -> Vec<Constructor> {
    self
      .constructors
      .iter()
      .map(|(name, id)| Constructor {
        constructor_id:   id.to_owned(),
        constructor_name: name.to_owned(),
      })
      .collect()
  }

  pub fn drivers(&self) -> &[Driver] { &self.drivers }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(cells: &[(&str, &str)]) -> TabularRow {
    cells
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  /// A roster with no constructor lookup, so every team gets a surrogate id.
  fn roster<const N: usize>(observations: [DriverObservation; N]) -> Roster {
    Roster::from_observations(observations, &LookupTable::new())
  }

  fn observation(number: u32, name: &str, team: &str) -> DriverObservation {
    DriverObservation {
      driver_number: number,
      full_name:     Some(name.into()),
      team_name:     Some(team.into()),
      country_code:  None,
    }
  }

  // ─── Lookup tables ─────────────────────────────────────────────────────────

  #[test]
  fn present_name_resolves_to_code() {
    let table: LookupTable = [("Max Verstappen", "VER")].into_iter().collect();
    assert_eq!(table.resolve("Max Verstappen"), "VER");
  }

  #[test]
  fn absent_name_resolves_to_sentinel() {
    let table: LookupTable = [("Max Verstappen", "VER")].into_iter().collect();
    assert_eq!(table.resolve("Lando Norris"), UNKNOWN);
    // Exact match only.
    assert_eq!(table.resolve("max verstappen"), UNKNOWN);
    assert_eq!(table.resolve("Max Verstappen "), UNKNOWN);
  }

  #[test]
  fn from_rows_skips_incomplete_rows() {
    let rows = vec![
      row(&[("Driver Name", "Max Verstappen"), ("Unique Code", "VER")]),
      row(&[("Driver Name", "Nameless")]),
      row(&[("Unique Code", "XXX")]),
      row(&[("Driver Name", "Lewis Hamilton"), ("Unique Code", "HAM")]),
    ];
    let table = LookupTable::from_rows(&rows, "Driver Name", "Unique Code");

    assert_eq!(table.len(), 2);
    assert_eq!(table.get("Lewis Hamilton"), Some("HAM"));
    assert_eq!(table.get("Nameless"), None);
  }

  #[test]
  fn repeated_name_takes_latest_code() {
    let table: LookupTable =
      [("Alpine", "ALP"), ("Ferrari", "FER"), ("Alpine", "ALP2")]
        .into_iter()
        .collect();

    assert_eq!(table.resolve("Alpine"), "ALP2");
    assert_eq!(table.iter().map(|(n, _)| n).collect::<Vec<_>>(), ["Alpine", "Ferrari"]);
  }

  #[test]
  fn resolve_result_maps_names_and_degrades_to_sentinel() {
    let lookups = Lookups {
      drivers:      [("Max Verstappen", "VER")].into_iter().collect(),
      constructors: [("Red Bull Racing", "RBR")].into_iter().collect(),
      tracks:       [("Bahrain", "BHR")].into_iter().collect(),
    };
    let obs = ResultObservation {
      track:         Some("Bahrain".into()),
      driver:        Some("Max Verstappen".into()),
      team:          Some("Unknown Racing".into()),
      position:      Some("1".into()),
      starting_grid: Some("2".into()),
    };

    let record = lookups.resolve_result(2023, SessionKind::Race, &obs).unwrap();
    assert_eq!(record.track_code, "BHR");
    assert_eq!(record.driver_code, "VER");
    assert_eq!(record.constructor_code, UNKNOWN);
    assert_eq!(record.position, Finish::Classified(1));
    assert_eq!(record.starting_grid, Some(2));

    let quali = lookups
      .resolve_result(2023, SessionKind::Qualifying, &obs)
      .unwrap();
    assert_eq!(quali.starting_grid, None);
  }

  #[test]
  fn resolve_result_requires_a_position() {
    let lookups = Lookups::default();
    let obs = ResultObservation { driver: Some("Max Verstappen".into()), ..Default::default() };

    assert!(lookups.resolve_result(2023, SessionKind::Race, &obs).is_none());

    let nameless = ResultObservation { position: Some("DNS".into()), ..Default::default() };
    let record = lookups
      .resolve_result(2023, SessionKind::Race, &nameless)
      .unwrap();
    assert_eq!(record.driver_code, UNKNOWN);
    assert_eq!(record.track_code, UNKNOWN);
    assert_eq!(record.position, Finish::Unclassified("DNS".into()));
  }

  #[test]
  fn lookups_emit_reference_entities() {
    let lookups = Lookups {
      constructors: [("Ferrari", "FER")].into_iter().collect(),
      ..Default::default()
    };
    assert_eq!(lookups.constructors(), [Constructor {
      constructor_id:   "FER".into(),
      constructor_name: "Ferrari".into(),
    }]);
    assert!(lookups.drivers().is_empty());
  }

  // ─── Surrogate ids ─────────────────────────────────────────────────────────

  #[test]
  fn surrogate_ids_are_stable_and_distinct() {
    let mut ids = SurrogateIds::new();
    let a = ids.assign("Ferrari").to_owned();
    let b = ids.assign("McLaren").to_owned();

    assert_eq!(ids.assign("Ferrari"), a);
    assert_ne!(a, b);
    assert_eq!(ids.len(), 2);
    assert_eq!(a, content_id("Ferrari"));
  }

  #[test]
  fn surrogate_ids_ignore_observation_order() {
    let names = ["Ferrari", "McLaren", "Williams", "Haas F1 Team"];
    let mut forward = SurrogateIds::new();
    let mut backward = SurrogateIds::new();
    for n in names {
      forward.assign(n);
    }
    for n in names.iter().rev() {
      backward.assign(n);
    }

    for n in names {
      assert_eq!(forward.get(n), backward.get(n));
    }
    assert_eq!(backward.resolve("Sauber"), UNKNOWN);
  }

  // ─── Roster ────────────────────────────────────────────────────────────────

  #[test]
  fn roster_resolves_driver_rows() {
    let roster = roster([observation(1, "Max Verstappen", "Red Bull")]);

    assert_eq!(roster.drivers(), [Driver {
      driver_id:    "1".into(),
      driver_name:  "Max Verstappen".into(),
      team_name:    Some("Red Bull".into()),
      country_code: None,
    }]);
    assert_eq!(roster.driver_of(1), "1");
    assert_eq!(roster.driver_of(99), UNKNOWN);
  }

  #[test]
  fn teammates_share_one_constructor() {
    let roster = roster([
      observation(1, "Max Verstappen", "Red Bull Racing"),
      observation(44, "Lewis Hamilton", "Mercedes"),
      observation(11, "Sergio Perez", "Red Bull Racing"),
    ]);

    assert_eq!(roster.constructor_of(1), roster.constructor_of(11));
    assert_ne!(roster.constructor_of(1), roster.constructor_of(44));
    assert_eq!(roster.constructor_rows().len(), 2);
    assert_eq!(roster.constructor_of(99), UNKNOWN);
  }

  #[test]
  fn listed_team_takes_its_lookup_code() {
    let lookups = Lookups {
      constructors: [("Mercedes", "MER")].into_iter().collect(),
      ..Default::default()
    };
    let roster = Roster::from_observations(
      [
        observation(44, "Lewis Hamilton", "Mercedes"),
        observation(1, "Max Verstappen", "Red Bull Racing"),
      ],
      &lookups.constructors,
    );

    assert_eq!(roster.constructor_of(44), "MER");
    assert_eq!(roster.constructor_of(1), content_id("Red Bull Racing"));
    // Both paths emit the same reference row for a listed team.
    assert_eq!(roster.constructor_rows()[0], lookups.constructors()[0]);
  }

  #[test]
  fn repeated_driver_keeps_latest_record() {
    let roster = roster([
      observation(3, "Daniel Ricciardo", "AlphaTauri"),
      DriverObservation {
        driver_number: 3,
        full_name:     Some("Daniel Ricciardo".into()),
        team_name:     None,
        country_code:  Some("AUS".into()),
      },
      DriverObservation {
        driver_number: 3,
        full_name:     Some("Daniel RICCIARDO".into()),
        team_name:     None,
        country_code:  None,
      },
    ]);

    assert_eq!(roster.drivers().len(), 1);
    let driver = &roster.drivers()[0];
    assert_eq!(driver.driver_name, "Daniel RICCIARDO");
    assert_eq!(driver.team_name.as_deref(), Some("AlphaTauri"));
    assert_eq!(driver.country_code.as_deref(), Some("AUS"));
    assert_eq!(roster.constructor_of(3), content_id("AlphaTauri"));
  }

  #[test]
  fn driver_row_follows_a_team_seen_before_the_name() {
    let roster = roster([
      DriverObservation {
        driver_number: 20,
        full_name:     None,
        team_name:     Some("Haas F1 Team".into()),
        country_code:  None,
      },
      DriverObservation {
        driver_number: 20,
        full_name:     Some("Kevin Magnussen".into()),
        team_name:     None,
        country_code:  Some("DEN".into()),
      },
    ]);

    assert_eq!(roster.drivers()[0].team_name.as_deref(), Some("Haas F1 Team"));
  }

  #[test]
  fn nameless_driver_still_maps_team() {
    let roster = roster([DriverObservation {
      driver_number: 20,
      full_name:     None,
      team_name:     Some("Haas F1 Team".into()),
      country_code:  None,
    }]);

    assert!(roster.drivers().is_empty());
    assert_eq!(roster.constructor_of(20), content_id("Haas F1 Team"));
    assert_eq!(roster.driver_of(20), UNKNOWN);
  }
}
