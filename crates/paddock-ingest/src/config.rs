//! Runtime configuration, deserialised from an optional TOML file layered
//! under `PADDOCK_*` environment variables.
//!
//! Every key has a default, so an empty configuration reproduces the stock
//! run: the 2022–2025 season files plus the 2023 session API data.

use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  pub store_path:        PathBuf,
  pub files_base_url:    String,
  pub api_base_url:      String,
  pub http_timeout_secs: u64,
  pub lookups:           LookupFiles,
  pub qualifying_files:  Vec<String>,
  pub race_files:        Vec<String>,
  /// Seasons pulled from the session API.
  pub api_years:         Vec<i32>,
  pub readiness:         Readiness,
}

/// Filenames of the three name → code lookup tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupFiles {
  pub drivers:      String,
  pub constructors: String,
  pub tracks:       String,
}

/// How long to wait for the store at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Readiness {
  pub attempts:      u32,
  pub interval_secs: u64,
}

impl Readiness {
  pub fn interval(&self) -> Duration { Duration::from_secs(self.interval_secs) }
}

impl Default for IngestConfig {
  fn default() -> Self {
    let seasons = |kind: &str, late_kind: &str| {
      let mut files: Vec<String> = (2022..=2024)
        .map(|year| format!("Formula1_{year}season_{kind}.csv"))
        .collect();
      files.push(format!("Formula1_2025Season_{late_kind}.csv"));
      files
    };

    Self {
      store_path:        PathBuf::from("paddock.db"),
      files_base_url:    paddock_sources::files::DEFAULT_BASE_URL.to_owned(),
      api_base_url:      paddock_sources::openf1::DEFAULT_BASE_URL.to_owned(),
      http_timeout_secs: 30,
      lookups:           LookupFiles::default(),
      qualifying_files:  seasons("qualifyingResults", "QualifyingResults"),
      race_files:        seasons("raceResults", "RaceResults"),
      api_years:         vec![2023],
      readiness:         Readiness::default(),
    }
  }
}

impl Default for LookupFiles {
  fn default() -> Self {
    Self {
      drivers:      "Unique codes Drivers.csv".to_owned(),
      constructors: "Unique codes Constructors.csv".to_owned(),
      tracks:       "Unique codes Tracks.csv".to_owned(),
    }
  }
}

impl Default for Readiness {
  fn default() -> Self { Self { attempts: 10, interval_secs: 3 } }
}

impl IngestConfig {
  /// Read `path` if it exists, then apply `PADDOCK_*` overrides
  /// (`PADDOCK_READINESS__ATTEMPTS=5`, `PADDOCK_API_YEARS=2023,2024`).
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    Self::from_file(File::from(path.into()).required(false))
  }

  fn from_file(file: impl Source + Send + Sync + 'static) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(file)
      .add_source(
        Environment::with_prefix("PADDOCK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("api_years")
          .with_list_parse_key("qualifying_files")
          .with_list_parse_key("race_files"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn http_timeout(&self) -> Duration { Duration::from_secs(self.http_timeout_secs) }
}
