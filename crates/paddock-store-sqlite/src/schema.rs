//! SQL schema for the Paddock SQLite store.
//!
//! Executed by `ensure_schema`; every statement is idempotent. There is no
//! migration machinery; `PRAGMA user_version` only records the layout the
//! file was created with.

use paddock_core::row::Table;

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS constructors (
    constructor_id   TEXT PRIMARY KEY,
    constructor_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS drivers (
    driver_id    TEXT PRIMARY KEY,   -- lookup code, or driver number from the session API
    driver_name  TEXT NOT NULL,
    team_name    TEXT,
    country_code TEXT
);

CREATE TABLE IF NOT EXISTS tracks (
    track_id     TEXT PRIMARY KEY,
    track_name   TEXT NOT NULL,
    circuit_key  TEXT,
    country_name TEXT,
    location     TEXT
);

CREATE TABLE IF NOT EXISTS qualifying_results (
    id               INTEGER PRIMARY KEY,
    year             INTEGER NOT NULL,
    track_code       TEXT NOT NULL,
    driver_code      TEXT NOT NULL,
    constructor_code TEXT NOT NULL,
    position         TEXT NOT NULL   -- rank, or a marker such as 'NC'
);

CREATE TABLE IF NOT EXISTS race_results (
    id               INTEGER PRIMARY KEY,
    year             INTEGER NOT NULL,
    track_code       TEXT NOT NULL,
    driver_code      TEXT NOT NULL,
    constructor_code TEXT NOT NULL,
    position         TEXT NOT NULL,
    starting_grid    INTEGER
);

-- Archival rows from the session API; the position columns hold JSON arrays.
CREATE TABLE IF NOT EXISTS race_results_raw (
    race_id         INTEGER PRIMARY KEY,
    meeting_key     TEXT NOT NULL,
    circuit_key     TEXT NOT NULL,
    date            TEXT NOT NULL,
    year            INTEGER NOT NULL,
    quali_positions TEXT NOT NULL,
    race_positions  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS qualifying_results_key_idx
    ON qualifying_results(year, track_code, driver_code);
CREATE INDEX IF NOT EXISTS race_results_key_idx
    ON race_results(year, track_code, driver_code);
CREATE INDEX IF NOT EXISTS race_results_raw_meeting_idx
    ON race_results_raw(meeting_key);

PRAGMA user_version = 1;
";

/// Reference tables that carry a sentinel row, with their id and name
/// columns.
pub const SENTINEL_TABLES: [(Table, &str, &str); 3] = [
  (Table::Constructors, "constructor_id", "constructor_name"),
  (Table::Drivers, "driver_id", "driver_name"),
  (Table::Tracks, "track_id", "track_name"),
];
