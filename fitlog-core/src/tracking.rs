//! Live-run tracker
//!
//! A [`TrackerSession`] combines three independent inputs:
//!
//! - position samples, which feed the route buffer and the distance total
//! - motion samples, which feed the step heuristic
//! - a one-second tick, which advances the duration regardless of samples
//!
//! Sensor subscriptions are owned by the session as [`Disposer`]s. Stopping,
//! abandoning or dropping the session releases every one of them exactly once.
//!
//! The step heuristic is an approximation: it counts large jumps in the
//! acceleration magnitude and halves the count. It is not a pedometer.

use crate::geo::{elevation_gain, haversine};
use crate::models::{NewRun, DEFAULT_RUN_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movement below this (metres) is treated as GPS jitter
pub const MIN_MOVEMENT_M: f64 = 3.0;

/// Samples must report accuracy better than this (metres) to add distance
pub const MAX_ACCURACY_M: f64 = 20.0;

/// Accuracy below this (metres) is shown as a good signal
pub const GOOD_ACCURACY_M: f64 = 15.0;

/// Magnitude change that counts as one raw step event
pub const STEP_THRESHOLD: f64 = 15.0;

/// Tracker errors
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Tracking session is not active")]
    NotTracking,

    #[error("Route data error: {0}")]
    RouteData(#[from] serde_json::Error),
}

/// One geolocation reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Reported horizontal accuracy in metres
    pub accuracy: f64,
    /// Unix time in seconds
    pub timestamp: f64,
}

/// One acceleration-including-gravity reading. Any axis may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// `|x + y + z|`, or `None` when an axis is missing
    pub fn magnitude(&self) -> Option<f64> {
        Some((self.x? + self.y? + self.z?).abs())
    }
}

/// Route sample serialized as `[lat, lon, alt, unix_secs]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint(pub f64, pub f64, pub f64, pub f64);

impl RoutePoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lon(&self) -> f64 {
        self.1
    }

    pub fn alt(&self) -> f64 {
        self.2
    }

    pub fn time(&self) -> f64 {
        self.3
    }
}

impl From<&PositionSample> for RoutePoint {
    fn from(s: &PositionSample) -> Self {
        RoutePoint(s.latitude, s.longitude, s.altitude.unwrap_or(0.0), s.timestamp)
    }
}

/// Parse a stored `route_data` string
pub fn parse_route(route_data: &str) -> Result<Vec<RoutePoint>, TrackError> {
    Ok(serde_json::from_str(route_data)?)
}

/// Serialize a route for `route_data`
pub fn encode_route(route: &[RoutePoint]) -> Result<String, TrackError> {
    Ok(serde_json::to_string(route)?)
}

/// Jitter-filtered running distance
#[derive(Debug, Clone)]
pub struct DistanceAccumulator {
    min_movement: f64,
    max_accuracy: f64,
    last: Option<(f64, f64)>,
    total: f64,
}

impl Default for DistanceAccumulator {
    fn default() -> Self {
        Self::new(MIN_MOVEMENT_M, MAX_ACCURACY_M)
    }
}

impl DistanceAccumulator {
    pub fn new(min_movement: f64, max_accuracy: f64) -> Self {
        Self {
            min_movement,
            max_accuracy,
            last: None,
            total: 0.0,
        }
    }

    /// Feed a sample and return the distance it added (0 when rejected).
    ///
    /// The reference position always moves to the newest sample, accepted
    /// or not.
    pub fn push(&mut self, sample: &PositionSample) -> f64 {
        let current = (sample.latitude, sample.longitude);
        let added = match self.last {
            Some((lat, lon)) => {
                let d = haversine(lat, lon, current.0, current.1);
                if d > self.min_movement && sample.accuracy < self.max_accuracy {
                    d
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.total += added;
        self.last = Some(current);
        added
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Step heuristic over acceleration magnitudes
#[derive(Debug, Clone)]
pub struct StepDetector {
    threshold: f64,
    last_magnitude: f64,
    raw: u64,
    enabled: bool,
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(STEP_THRESHOLD)
    }
}

impl StepDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_magnitude: 0.0,
            raw: 0,
            enabled: true,
        }
    }

    /// Feed a sample; returns true when it counted a raw step event
    pub fn push(&mut self, sample: &MotionSample) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(magnitude) = sample.magnitude() else {
            return false;
        };
        let counted = (magnitude - self.last_magnitude).abs() > self.threshold;
        if counted {
            self.raw += 1;
        }
        self.last_magnitude = magnitude;
        counted
    }

    /// Stop counting (motion permission refused)
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn raw_count(&self) -> u64 {
        self.raw
    }

    /// Reported steps: raw events halved, rounded down
    pub fn steps(&self) -> u64 {
        self.raw / 2
    }
}

/// Releases one sensor subscription.
///
/// Disposing twice is a no-op and dropping an undisposed `Disposer`
/// disposes it.
pub struct Disposer {
    label: &'static str,
    release: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    pub fn new(label: &'static str, release: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_disposed(&self) -> bool {
        self.release.is_none()
    }

    pub fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(subscription = self.label, "Releasing sensor subscription");
            release();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("label", &self.label)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Lifecycle of a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    Tracking,
    Finished,
    Abandoned,
}

/// State of one live run
#[derive(Debug)]
pub struct TrackerSession {
    distance: DistanceAccumulator,
    steps: StepDetector,
    route: Vec<RoutePoint>,
    duration_seconds: i64,
    accuracy: Option<f64>,
    subscriptions: Vec<Disposer>,
    state: TrackerState,
}

impl Default for TrackerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerSession {
    pub fn new() -> Self {
        Self {
            distance: DistanceAccumulator::default(),
            steps: StepDetector::default(),
            route: Vec::new(),
            duration_seconds: 0,
            accuracy: None,
            subscriptions: Vec::new(),
            state: TrackerState::Tracking,
        }
    }

    /// Hand a subscription to the session. A session that has already
    /// ended releases it immediately.
    pub fn attach(&mut self, mut subscription: Disposer) {
        if self.state == TrackerState::Tracking {
            self.subscriptions.push(subscription);
        } else {
            subscription.dispose();
        }
    }

    pub fn on_position(&mut self, sample: &PositionSample) {
        if !self.is_tracking() {
            return;
        }
        self.accuracy = Some(sample.accuracy);
        self.route.push(RoutePoint::from(sample));
        let added = self.distance.push(sample);
        tracing::trace!(added, accuracy = sample.accuracy, "Position sample");
    }

    pub fn on_motion(&mut self, sample: &MotionSample) {
        if self.is_tracking() {
            self.steps.push(sample);
        }
    }

    /// One elapsed second
    pub fn on_tick(&mut self) {
        if self.is_tracking() {
            self.duration_seconds += 1;
        }
    }

    /// Sensor failures degrade tracking but never end it
    pub fn on_sensor_error(&self, source: &str, message: &str) {
        tracing::warn!(source, error = message, "Sensor error, continuing without sample");
    }

    /// Motion permission refused: keep tracking without steps
    pub fn disable_steps(&mut self) {
        tracing::info!("Motion sensing unavailable, step counting disabled");
        self.steps.disable();
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance.total()
    }

    pub fn steps(&self) -> u64 {
        self.steps.steps()
    }

    pub fn steps_enabled(&self) -> bool {
        self.steps.is_enabled()
    }

    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    pub fn route(&self) -> &[RoutePoint] {
        &self.route
    }

    /// Latest accuracy rounded to whole metres
    pub fn accuracy(&self) -> Option<i64> {
        self.accuracy.map(|a| a.round() as i64)
    }

    pub fn has_good_signal(&self) -> bool {
        self.accuracy.map(|a| a < GOOD_ACCURACY_M).unwrap_or(false)
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn elevation_gain(&self) -> f64 {
        elevation_gain(self.route.iter().map(RoutePoint::alt))
    }

    /// Stop tracking and build the run to submit.
    ///
    /// All subscriptions are released before the payload is built.
    pub fn finish(
        &mut self,
        start_time: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<NewRun, TrackError> {
        if !self.is_tracking() {
            return Err(TrackError::NotTracking);
        }
        self.release_all();
        self.state = TrackerState::Finished;

        let run = NewRun {
            start_time: Some(start_time),
            duration_seconds: self.duration_seconds,
            distance_meters: self.distance.total(),
            elevation_gain_meters: self.elevation_gain(),
            steps: Some(self.steps.steps() as i64),
            route_data: Some(encode_route(&self.route)?),
            run_type: Some(DEFAULT_RUN_TYPE.to_string()),
            notes,
            ..Default::default()
        };

        tracing::info!(
            distance_m = run.distance_meters,
            duration_s = run.duration_seconds,
            points = self.route.len(),
            "Tracking session finished"
        );
        Ok(run)
    }

    /// Stop tracking and discard everything
    pub fn abandon(&mut self) {
        if self.is_tracking() {
            self.release_all();
            self.state = TrackerState::Abandoned;
            tracing::info!(points = self.route.len(), "Tracking session abandoned");
        }
    }

    fn release_all(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
    }
}

impl Drop for TrackerSession {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Degrees of latitude per metre on the 6371 km sphere
    const DEG_PER_M: f64 = 1.0 / 111_194.93;

    fn sample(north_m: f64, accuracy: f64, t: f64) -> PositionSample {
        PositionSample {
            latitude: 45.0 + north_m * DEG_PER_M,
            longitude: 7.0,
            altitude: Some(200.0),
            accuracy,
            timestamp: t,
        }
    }

    fn counting_disposer(label: &'static str, counter: &Rc<Cell<u32>>) -> Disposer {
        let counter = counter.clone();
        Disposer::new(label, move || counter.set(counter.get() + 1))
    }

    #[test]
    fn test_distance_sums_pairwise_haversine() {
        let mut acc = DistanceAccumulator::default();
        let samples: Vec<_> = (0..11).map(|i| sample(i as f64 * 5.0, 10.0, i as f64)).collect();

        let mut expected = 0.0;
        for pair in samples.windows(2) {
            expected += haversine(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            );
        }
        for s in &samples {
            acc.push(s);
        }
        assert!((acc.total() - expected).abs() < 1e-6);
        assert!((acc.total() - 50.0).abs() < 0.1, "got {}", acc.total());
    }

    #[test]
    fn test_inaccurate_sample_adds_nothing() {
        let mut acc = DistanceAccumulator::default();
        acc.push(&sample(0.0, 10.0, 0.0));
        assert_eq!(acc.push(&sample(50.0, 25.0, 1.0)), 0.0);
        assert_eq!(acc.total(), 0.0);
    }

    #[test]
    fn test_jitter_below_threshold_ignored() {
        let mut acc = DistanceAccumulator::default();
        acc.push(&sample(0.0, 5.0, 0.0));
        assert_eq!(acc.push(&sample(2.0, 5.0, 1.0)), 0.0);
        assert_eq!(acc.total(), 0.0);
    }

    #[test]
    fn test_reference_advances_on_rejected_sample() {
        let mut acc = DistanceAccumulator::default();
        acc.push(&sample(0.0, 5.0, 0.0));
        // Rejected for accuracy, but becomes the new reference
        acc.push(&sample(100.0, 30.0, 1.0));
        let added = acc.push(&sample(105.0, 5.0, 2.0));
        assert!((added - 5.0).abs() < 0.01, "got {added}");
    }

    #[test]
    fn test_steps_are_halved_crossings() {
        let mut detector = StepDetector::default();
        // 0 -> 20 -> 0 -> 20 ... every sample jumps by 20
        for i in 0..7 {
            let v = if i % 2 == 0 { 20.0 } else { 0.0 };
            detector.push(&MotionSample::new(v, 0.0, 0.0));
        }
        assert_eq!(detector.raw_count(), 7);
        assert_eq!(detector.steps(), 3);
    }

    #[test]
    fn test_small_motion_not_counted() {
        let mut detector = StepDetector::default();
        detector.push(&MotionSample::new(3.0, 3.0, 3.5));
        detector.push(&MotionSample::new(4.0, 4.0, 4.0));
        assert_eq!(detector.raw_count(), 0);
    }

    #[test]
    fn test_magnitude_uses_absolute_axis_sum() {
        assert_eq!(MotionSample::new(-10.0, -5.0, -5.0).magnitude(), Some(20.0));
        let missing = MotionSample {
            x: Some(1.0),
            y: None,
            z: Some(1.0),
        };
        assert_eq!(missing.magnitude(), None);
    }

    #[test]
    fn test_missing_axis_ignored() {
        let mut detector = StepDetector::default();
        detector.push(&MotionSample {
            x: Some(50.0),
            y: None,
            z: None,
        });
        assert_eq!(detector.raw_count(), 0);
    }

    #[test]
    fn test_disabled_detector_counts_nothing() {
        let mut detector = StepDetector::default();
        detector.disable();
        detector.push(&MotionSample::new(40.0, 0.0, 0.0));
        assert_eq!(detector.raw_count(), 0);
    }

    #[test]
    fn test_duration_independent_of_samples() {
        let mut session = TrackerSession::new();
        for _ in 0..90 {
            session.on_tick();
        }
        assert_eq!(session.duration_seconds(), 90);
        assert!(session.route().is_empty());
    }

    #[test]
    fn test_route_keeps_every_sample() {
        let mut session = TrackerSession::new();
        session.on_position(&sample(0.0, 5.0, 100.0));
        session.on_position(&sample(1.0, 50.0, 101.0));
        let mut no_alt = sample(2.0, 5.0, 102.0);
        no_alt.altitude = None;
        session.on_position(&no_alt);

        assert_eq!(session.route().len(), 3);
        assert_eq!(session.route()[2].alt(), 0.0);
        assert_eq!(session.accuracy(), Some(5));
        assert!(session.has_good_signal());
    }

    #[test]
    fn test_finish_releases_and_builds_run() {
        let released = Rc::new(Cell::new(0));
        let mut session = TrackerSession::new();
        session.attach(counting_disposer("position", &released));
        session.attach(counting_disposer("motion", &released));
        session.attach(counting_disposer("ticker", &released));

        for i in 0..5 {
            session.on_position(&sample(i as f64 * 10.0, 5.0, i as f64));
            session.on_tick();
        }
        for i in 0..4 {
            let v = if i % 2 == 0 { 20.0 } else { 0.0 };
            session.on_motion(&MotionSample::new(v, 0.0, 0.0));
        }

        let now = Utc::now();
        let run = session.finish(now, Some("Evening".into())).unwrap();

        assert_eq!(released.get(), 3);
        assert_eq!(session.active_subscriptions(), 0);
        assert_eq!(session.state(), TrackerState::Finished);
        assert_eq!(run.duration_seconds, 5);
        assert_eq!(run.steps, Some(2));
        assert_eq!(run.run_type.as_deref(), Some("Run"));
        assert_eq!(run.start_time, Some(now));
        assert!((run.distance_meters - 40.0).abs() < 0.1);

        let route = parse_route(run.route_data.as_deref().unwrap()).unwrap();
        assert_eq!(route.len(), 5);
        assert_eq!(route[0].time(), 0.0);
    }

    #[test]
    fn test_finish_twice_fails() {
        let mut session = TrackerSession::new();
        session.finish(Utc::now(), None).unwrap();
        assert!(matches!(
            session.finish(Utc::now(), None),
            Err(TrackError::NotTracking)
        ));
    }

    #[test]
    fn test_abandon_releases_without_run() {
        let released = Rc::new(Cell::new(0));
        let mut session = TrackerSession::new();
        session.attach(counting_disposer("position", &released));
        session.abandon();
        session.abandon();
        assert_eq!(released.get(), 1);
        assert_eq!(session.state(), TrackerState::Abandoned);

        // Samples after teardown are ignored
        session.on_tick();
        session.on_position(&sample(0.0, 5.0, 0.0));
        assert_eq!(session.duration_seconds(), 0);
        assert!(session.route().is_empty());
    }

    #[test]
    fn test_attach_after_end_disposes_immediately() {
        let released = Rc::new(Cell::new(0));
        let mut session = TrackerSession::new();
        session.abandon();
        session.attach(counting_disposer("late", &released));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let released = Rc::new(Cell::new(0));
        {
            let mut session = TrackerSession::new();
            session.attach(counting_disposer("position", &released));
            session.attach(counting_disposer("ticker", &released));
        }
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn test_disable_steps_keeps_distance() {
        let mut session = TrackerSession::new();
        session.disable_steps();
        session.on_motion(&MotionSample::new(40.0, 0.0, 0.0));
        session.on_position(&sample(0.0, 5.0, 0.0));
        session.on_position(&sample(10.0, 5.0, 1.0));
        assert_eq!(session.steps(), 0);
        assert!(!session.steps_enabled());
        assert!(session.distance_meters() > 9.9);
    }

    #[test]
    fn test_route_json_shape() {
        let json = encode_route(&[RoutePoint(1.5, 2.5, 0.0, 10.0)]).unwrap();
        assert_eq!(json, "[[1.5,2.5,0.0,10.0]]");
        assert!(parse_route("not json").is_err());
    }
}
