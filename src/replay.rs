//! Sensor Trace Replay
//!
//! Feeds a recorded CSV sensor trace through [`TrackerSession`] and
//! produces the run the live tracker would have submitted. Useful for
//! checking the distance filter and step heuristic against real data.
//!
//! Expected columns (header row required):
//!
//! ```text
//! timestamp,kind,lat,lon,alt,accuracy,x,y,z
//! 1700000000,position,51.5,-0.12,10,8,,,
//! 1700000000.2,motion,,,,,0.1,9.8,0.3
//! 1700000001,error,,,,,,,
//! ```
//!
//! `timestamp` is unix seconds. `kind` is `position`, `motion` or `error`.
//! Duration is advanced one tick per whole second elapsed since the first row.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use fitlog_core::models::NewRun;
use fitlog_core::tracking::{MotionSample, PositionSample, TrackError, TrackerSession};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Trace contains no rows")]
    Empty,

    #[error("Tracker error: {0}")]
    Track(#[from] TrackError),

    #[error("Invalid start time {0}")]
    InvalidTimestamp(f64),
}

#[derive(Debug, Deserialize)]
struct TraceRow {
    timestamp: f64,
    kind: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    alt: Option<f64>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
}

/// Outcome of a replay
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    /// The run the tracker would submit
    pub run: NewRun,
    pub positions: usize,
    pub motions: usize,
    pub sensor_errors: usize,
    /// Rows with an unknown kind or missing coordinates
    pub skipped: usize,
}

/// Replays sensor traces through a fresh tracker session
#[derive(Debug, Clone, Default)]
pub struct TraceReplayer {
    steps_disabled: bool,
    notes: Option<String>,
}

impl TraceReplayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay as if motion permission had been refused
    pub fn without_steps(mut self) -> Self {
        self.steps_disabled = true;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn replay_file(&self, path: &Path) -> Result<ReplaySummary, ReplayError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        self.replay(reader)
    }

    pub fn replay_reader<R: Read>(&self, reader: R) -> Result<ReplaySummary, ReplayError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        self.replay(reader)
    }

    fn replay<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<ReplaySummary, ReplayError> {
        let mut session = TrackerSession::new();
        if self.steps_disabled {
            session.disable_steps();
        }

        let mut first: Option<f64> = None;
        let mut ticks = 0i64;
        let (mut positions, mut motions, mut sensor_errors, mut skipped) = (0, 0, 0, 0);

        for result in reader.deserialize::<TraceRow>() {
            let row = result?;
            let origin = *first.get_or_insert(row.timestamp);

            let elapsed = (row.timestamp - origin).floor() as i64;
            while ticks < elapsed {
                session.on_tick();
                ticks += 1;
            }

            match row.kind.as_str() {
                "position" => match (row.lat, row.lon) {
                    (Some(latitude), Some(longitude)) => {
                        session.on_position(&PositionSample {
                            latitude,
                            longitude,
                            altitude: row.alt,
                            accuracy: row.accuracy.unwrap_or(f64::MAX),
                            timestamp: row.timestamp,
                        });
                        positions += 1;
                    }
                    _ => skipped += 1,
                },
                "motion" => {
                    session.on_motion(&MotionSample {
                        x: row.x,
                        y: row.y,
                        z: row.z,
                    });
                    motions += 1;
                }
                "error" => {
                    session.on_sensor_error("trace", "recorded sensor error");
                    sensor_errors += 1;
                }
                other => {
                    tracing::debug!(kind = other, "Skipping unknown trace row");
                    skipped += 1;
                }
            }
        }

        let origin = first.ok_or(ReplayError::Empty)?;
        let start_time = DateTime::<Utc>::from_timestamp(origin.floor() as i64, 0)
            .ok_or(ReplayError::InvalidTimestamp(origin))?;
        let run = session.finish(start_time, self.notes.clone())?;

        tracing::info!(
            positions,
            motions,
            skipped,
            distance_m = run.distance_meters,
            "Replayed sensor trace"
        );

        Ok(ReplaySummary {
            run,
            positions,
            motions,
            sensor_errors,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitlog_core::geo::haversine;
    use std::io::Write;

    const HEADER: &str = "timestamp,kind,lat,lon,alt,accuracy,x,y,z\n";

    #[test]
    fn test_replay_distance_and_duration() {
        let trace = format!(
            "{HEADER}\
             1700000000,position,51.50000,-0.12,10,8,,,\n\
             1700000005,position,51.50005,-0.12,12,8,,,\n\
             1700000010,position,51.50010,-0.12,11,30,,,\n\
             1700000012,position,51.50015,-0.12,15,5,,,\n"
        );
        let summary = TraceReplayer::new().replay_reader(trace.as_bytes()).unwrap();

        let leg = haversine(51.50000, -0.12, 51.50005, -0.12);
        // Third sample is too inaccurate; the fourth still measures from it
        let expected = leg + haversine(51.50010, -0.12, 51.50015, -0.12);
        assert!((summary.run.distance_meters - expected).abs() < 1e-6);
        assert_eq!(summary.run.duration_seconds, 12);
        assert_eq!(summary.positions, 4);
        assert_eq!(summary.run.elevation_gain_meters, 6.0);
        assert_eq!(summary.run.run_type.as_deref(), Some("Run"));
        assert_eq!(
            summary.run.start_time.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_replay_steps() {
        let mut trace = String::from(HEADER);
        for i in 0..8 {
            let y = if i % 2 == 0 { 30.0 } else { 5.0 };
            trace.push_str(&format!("{},motion,,,,,0,{y},0\n", 1_700_000_000 + i));
        }
        // Missing axis is ignored
        trace.push_str("1700000009,motion,,,,,0,,0\n");

        let summary = TraceReplayer::new().replay_reader(trace.as_bytes()).unwrap();
        assert_eq!(summary.motions, 9);
        // 8 samples: the first jump from 0 counts too, giving 8 crossings
        assert_eq!(summary.run.steps, Some(4));

        let disabled = TraceReplayer::new()
            .without_steps()
            .replay_reader(trace.as_bytes())
            .unwrap();
        assert_eq!(disabled.run.steps, Some(0));
    }

    #[test]
    fn test_unknown_rows_skipped() {
        let trace = format!(
            "{HEADER}\
             1700000000,position,51.5,-0.12,,8,,,\n\
             1700000001,heartbeat,,,,,,,\n\
             1700000002,position,,,,8,,,\n\
             1700000003,error,,,,,,,\n"
        );
        let summary = TraceReplayer::new().replay_reader(trace.as_bytes()).unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.sensor_errors, 1);
        assert_eq!(summary.positions, 1);
    }

    #[test]
    fn test_empty_trace_rejected() {
        let err = TraceReplayer::new().replay_reader(HEADER.as_bytes()).unwrap_err();
        assert!(matches!(err, ReplayError::Empty));
    }

    #[test]
    fn test_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{HEADER}1700000000,position,51.5,-0.12,5,8,,,\n").unwrap();

        let summary = TraceReplayer::new()
            .with_notes("Recorded")
            .replay_file(file.path())
            .unwrap();
        assert_eq!(summary.run.notes.as_deref(), Some("Recorded"));
        assert_eq!(summary.run.route_data.as_deref(), Some("[[51.5,-0.12,5.0,1700000000.0]]"));
    }
}
