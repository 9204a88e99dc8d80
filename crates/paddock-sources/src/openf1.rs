//! Async client for the OpenF1 session API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use paddock_core::{
  model::{DriverObservation, SessionKind},
  standings::PositionUpdate,
};
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1/";

// ─── Records ─────────────────────────────────────────────────────────────────

/// `GET /drivers`: one record per driver per session.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverRecord {
  pub driver_number: u32,
  pub full_name:     Option<String>,
  pub team_name:     Option<String>,
  pub country_code:  Option<String>,
}

impl From<DriverRecord> for DriverObservation {
  fn from(r: DriverRecord) -> Self {
    Self {
      driver_number: r.driver_number,
      full_name:     r.full_name,
      team_name:     r.team_name,
      country_code:  r.country_code,
    }
  }
}

/// `GET /meetings`: a grand prix weekend.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRecord {
  pub meeting_key:        i64,
  pub circuit_key:        i64,
  pub circuit_short_name: Option<String>,
  pub country_name:       Option<String>,
  pub location:           Option<String>,
  pub date_start:         String,
  pub year:               i32,
}

/// `GET /sessions`: one practice, qualifying, sprint or race session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
  pub session_key:  i64,
  pub session_name: String,
}

/// `GET /position`: one sample of a driver's running position.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionRecord {
  pub driver_number: u32,
  pub position:      u32,
  pub date:          Option<DateTime<Utc>>,
}

impl From<PositionRecord> for PositionUpdate {
  fn from(r: PositionRecord) -> Self {
    Self {
      driver_number: r.driver_number,
      position:      r.position,
      date:          r.date,
    }
  }
}

/// Pick the session of `kind` from a meeting's sessions.
///
/// An exact label match wins (so `Qualifying` beats `Sprint Qualifying`);
/// otherwise the first label containing the expected name.
pub fn find_session(sessions: &[SessionRecord], kind: SessionKind) -> Option<&SessionRecord> {
  let label = kind.label();
  sessions
    .iter()
    .find(|s| s.session_name == label)
    .or_else(|| sessions.iter().find(|s| s.session_name.contains(label)))
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the OpenF1 REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenF1Client {
  client: Client,
  base:   Url,
}

impl OpenF1Client {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base: crate::base_url(base_url)? })
  }

  /// `GET {base}/{endpoint}?{query}`.
  ///
  /// A transport failure or non-2xx status yields an empty list; a body that
  /// does not decode is an error.
  async fn fetch<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>> {
    let url = self
      .base
      .join(endpoint)
      .map_err(|_| Error::InvalidUrl(format!("{}{endpoint}", self.base)))?;
    debug!(%url, ?query, "fetching");

    let resp = match self.client.get(url).query(query).send().await {
      Ok(resp) => resp,
      Err(e) => {
        warn!(endpoint, error = %e, "request failed; treating as empty");
        return Ok(Vec::new());
      }
    };
    if !resp.status().is_success() {
      warn!(endpoint, status = %resp.status(), "non-success response; treating as empty");
      return Ok(Vec::new());
    }
    let body = match resp.bytes().await {
      Ok(body) => body,
      Err(e) => {
        warn!(endpoint, error = %e, "reading body failed; treating as empty");
        return Ok(Vec::new());
      }
    };

    serde_json::from_slice(&body).map_err(|source| Error::Decode {
      endpoint: endpoint.to_owned(),
      source,
    })
  }

  /// `GET /drivers?year=<year>`
  pub async fn drivers(&self, year: i32) -> Result<Vec<DriverRecord>> {
    self.fetch("drivers", &[("year", year.to_string())]).await
  }

  /// `GET /meetings?year=<year>`
  pub async fn meetings(&self, year: i32) -> Result<Vec<MeetingRecord>> {
    self.fetch("meetings", &[("year", year.to_string())]).await
  }

  /// `GET /sessions?meeting_key=<key>`
  pub async fn sessions(&self, meeting_key: i64) -> Result<Vec<SessionRecord>> {
    self
      .fetch("sessions", &[("meeting_key", meeting_key.to_string())])
      .await
  }

  /// `GET /position?session_key=<key>`
  pub async fn positions(&self, session_key: i64) -> Result<Vec<PositionRecord>> {
    self
      .fetch("position", &[("session_key", session_key.to_string())])
      .await
  }
}
