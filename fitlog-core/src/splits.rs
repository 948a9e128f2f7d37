//! Per-kilometre splits and elevation profile from a recorded route

use crate::geo::haversine;
use crate::tracking::RoutePoint;
use serde::{Deserialize, Serialize};

/// Distance that closes a split (metres)
pub const SPLIT_DISTANCE_M: f64 = 1000.0;

/// A trailing partial split shorter than this (metres) is dropped
pub const MIN_PARTIAL_SPLIT_M: f64 = 100.0;

/// One split of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// 1-based split number
    pub index: usize,
    /// Elapsed seconds across the split
    pub seconds: f64,
    /// Distance covered in metres
    pub distance: f64,
}

impl Split {
    /// Seconds rounded to whole seconds for display
    pub fn whole_seconds(&self) -> i64 {
        self.seconds.round() as i64
    }
}

/// Walk the route summing pairwise distance.
///
/// Whenever the running sum reaches 1000 m a split is emitted, covering the
/// time since the previous split's closing sample. A final partial split is
/// emitted only when it exceeds 100 m.
pub fn compute_splits(route: &[RoutePoint]) -> Vec<Split> {
    if route.len() < 2 {
        return Vec::new();
    }

    let mut splits = Vec::new();
    let mut current = 0.0;
    let mut start = 0;

    for i in 1..route.len() {
        current += haversine(route[i - 1].lat(), route[i - 1].lon(), route[i].lat(), route[i].lon());
        if current >= SPLIT_DISTANCE_M {
            splits.push(Split {
                index: splits.len() + 1,
                seconds: route[i].time() - route[start].time(),
                distance: current,
            });
            current = 0.0;
            start = i;
        }
    }

    if current > MIN_PARTIAL_SPLIT_M {
        let last = route.len() - 1;
        splits.push(Split {
            index: splits.len() + 1,
            seconds: route[last].time() - route[start].time(),
            distance: current,
        });
    }

    splits
}

/// Altitude of every `every`-th route sample, for the elevation chart
pub fn elevation_profile(route: &[RoutePoint], every: usize) -> Vec<f64> {
    route
        .iter()
        .step_by(every.max(1))
        .map(RoutePoint::alt)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEG_PER_M: f64 = 1.0 / 111_194.93;

    /// Straight line north, one point every `step_m` metres, 5 s apart
    fn line(points: usize, step_m: f64) -> Vec<RoutePoint> {
        (0..points)
            .map(|i| RoutePoint(10.0 + i as f64 * step_m * DEG_PER_M, 20.0, 0.0, i as f64 * 5.0))
            .collect()
    }

    #[test]
    fn test_short_route_has_no_splits() {
        assert!(compute_splits(&[]).is_empty());
        assert!(compute_splits(&line(1, 10.0)).is_empty());
    }

    #[test]
    fn test_full_and_partial_splits() {
        // 2.75 km in 110 m steps: 26 points
        let route = line(26, 110.0);
        let splits = compute_splits(&route);

        assert_eq!(splits.len(), 3);
        assert_eq!(splits[0].index, 1);
        assert!(splits[0].distance >= 1000.0);
        assert!(splits[1].distance >= 1000.0);
        assert!((splits[2].distance - 550.0).abs() < 1.0);
        assert!(splits[0].whole_seconds() > 0);
    }

    #[test]
    fn test_small_remainder_dropped() {
        // ~1.05 km: one split, 50 m remainder is dropped
        let route = line(22, 50.0);
        let splits = compute_splits(&route);
        assert_eq!(splits.len(), 1);
    }

    #[test]
    fn test_split_time_measured_from_previous_close() {
        let route = line(21, 100.0);
        let splits = compute_splits(&route);
        let sum: f64 = splits.iter().map(|s| s.seconds).sum();
        let total = route.last().unwrap().time() - route[0].time();
        assert!((sum - total).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_profile_sampling() {
        let route: Vec<_> = (0..25).map(|i| RoutePoint(0.0, 0.0, i as f64, 0.0)).collect();
        assert_eq!(elevation_profile(&route, 10), vec![0.0, 10.0, 20.0]);
        assert_eq!(elevation_profile(&route, 0).len(), 25);
    }
}
