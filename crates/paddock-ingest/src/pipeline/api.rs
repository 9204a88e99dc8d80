//! Session API → season roster, tracks and per-meeting raw snapshots.

use paddock_core::{
  model::{DriverObservation, RawSessionSnapshot, SessionKind, Track},
  resolve::{Lookups, Roster, SurrogateIds},
  row::Table,
  standings::{Placement, PositionUpdate, Standings, fold_terminal, merge},
  store::ResultStore,
};
use paddock_sources::openf1::{MeetingRecord, SessionRecord, find_session};
use tracing::{info, warn};

use super::Ingest;
use crate::{Result, writer::{RunReport, write_records}};

/// Tracks of the season's meetings, one per circuit name. The id is
/// derived from the circuit's short name.
fn tracks_of(meetings: &[MeetingRecord]) -> Vec<Track> {
  let mut ids = SurrogateIds::new();
  let mut tracks = Vec::new();
  for meeting in meetings {
    let Some(name) = meeting.circuit_short_name.as_deref().filter(|n| !n.is_empty()) else {
      warn!(meeting_key = meeting.meeting_key, "meeting has no circuit name; no track recorded");
      continue;
    };
    if ids.get(name).is_some() {
      continue;
    }
    tracks.push(Track {
      track_id:     ids.assign(name).to_owned(),
      track_name:   name.to_owned(),
      circuit_key:  Some(meeting.circuit_key.to_string()),
      country_name: meeting.country_name.clone(),
      location:     meeting.location.clone(),
    });
  }
  tracks
}

impl<S: ResultStore> Ingest<'_, S> {
  pub(super) async fn run_api_season(
    &self,
    year: i32,
    lookups: &Lookups,
    report: &mut RunReport,
  ) -> Result<()> {
    let drivers = self.api.drivers(year).await?;
    let roster = Roster::from_observations(
      drivers.into_iter().map(DriverObservation::from),
      &lookups.constructors,
    );
    info!(
      year,
      drivers = roster.drivers().len(),
      constructors = roster.constructors().len(),
      "season roster built"
    );

    report.record(write_records(self.store, Table::Constructors, &roster.constructor_rows()).await?);
    report.record(write_records(self.store, Table::Drivers, roster.drivers()).await?);

    let meetings = self.api.meetings(year).await?;
    report.record(write_records(self.store, Table::Tracks, &tracks_of(&meetings)).await?);

    let mut snapshots = Vec::with_capacity(meetings.len());
    for meeting in &meetings {
      snapshots.push(self.snapshot(meeting, &roster).await?);
    }
    report.record(write_records(self.store, Table::RaceResultsRaw, &snapshots).await?);
    Ok(())
  }

  async fn snapshot(&self, meeting: &MeetingRecord, roster: &Roster) -> Result<RawSessionSnapshot> {
    let sessions = self.api.sessions(meeting.meeting_key).await?;
    Ok(RawSessionSnapshot {
      meeting_key:     meeting.meeting_key.to_string(),
      circuit_key:     meeting.circuit_key.to_string(),
      date:            meeting.date_start.clone(),
      year:            meeting.year,
      quali_positions: self
        .standings(meeting, &sessions, SessionKind::Qualifying, roster)
        .await?,
      race_positions:  self
        .standings(meeting, &sessions, SessionKind::Race, roster)
        .await?,
    })
  }

  /// Final standings of the `kind` session of `meeting`; empty when the
  /// meeting has no such session.
  async fn standings(
    &self,
    meeting: &MeetingRecord,
    sessions: &[SessionRecord],
    kind: SessionKind,
    roster: &Roster,
  ) -> Result<Standings<Placement>> {
    let Some(session) = find_session(sessions, kind) else {
      warn!(meeting_key = meeting.meeting_key, session = kind.label(), "session not found");
      return Ok(Standings::new());
    };

    let updates: Vec<PositionUpdate> = self
      .api
      .positions(session.session_key)
      .await?
      .into_iter()
      .map(PositionUpdate::from)
      .collect();
    let fold = fold_terminal(&updates);

    if !fold.displaced.is_empty() {
      warn!(
        session_key = session.session_key,
        drivers = ?fold.displaced,
        "drivers lost their final position to a later update"
      );
    }
    if !fold.rejected.is_empty() {
      warn!(
        session_key = session.session_key,
        drivers = ?fold.rejected,
        "drivers with final position 0 left out"
      );
    }
    Ok(merge(&fold.standings, roster))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn meeting(key: i64, circuit_key: i64, name: Option<&str>) -> MeetingRecord {
    MeetingRecord {
      meeting_key:        key,
      circuit_key,
      circuit_short_name: name.map(str::to_owned),
      country_name:       Some("Singapore".into()),
      location:           Some("Marina Bay".into()),
      date_start:         "2023-09-15T09:30:00+00:00".into(),
      year:               2023,
    }
  }

  #[test]
  fn one_track_per_circuit_name() {
    let tracks = tracks_of(&[
      meeting(1219, 61, Some("Singapore")),
      meeting(1220, 46, Some("Suzuka")),
      meeting(1299, 61, Some("Singapore")),
      meeting(1300, 0, None),
    ]);

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].track_name, "Singapore");
    assert_eq!(tracks[0].circuit_key.as_deref(), Some("61"));
    assert_eq!(tracks[0].track_id, paddock_core::resolve::content_id("Singapore"));
    assert_ne!(tracks[0].track_id, tracks[1].track_id);
  }
}
