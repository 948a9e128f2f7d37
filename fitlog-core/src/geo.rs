//! Great-circle distance and elevation helpers

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6371e3;

/// Haversine distance in metres between two WGS84 coordinates
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Sum of positive altitude deltas along a sequence of altitudes
pub fn elevation_gain(altitudes: impl IntoIterator<Item = f64>) -> f64 {
    let mut gain = 0.0;
    let mut prev: Option<f64> = None;
    for alt in altitudes {
        if let Some(p) = prev {
            if alt > p {
                gain += alt - p;
            }
        }
        prev = Some(alt);
    }
    gain
}

/// Axis-aligned bounding box of a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Bounding box of `(lat, lon)` pairs, `None` when empty
    pub fn of(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (lat, lon) = iter.next()?;
        let mut bounds = Bounds {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        };
        for (lat, lon) in iter {
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.max_lon = bounds.max_lon.max(lon);
        }
        Some(bounds)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Project a coordinate into a `width` x `height` viewport with `padding`.
    ///
    /// Equirectangular, with longitude scaled by the cosine of the centre
    /// latitude and the aspect ratio preserved. North is up.
    pub fn project(&self, lat: f64, lon: f64, width: f64, height: f64, padding: f64) -> (f64, f64) {
        let (center_lat, _) = self.center();
        let lon_scale = center_lat.to_radians().cos().max(1e-6);

        let span_x = ((self.max_lon - self.min_lon) * lon_scale).max(1e-9);
        let span_y = (self.max_lat - self.min_lat).max(1e-9);

        let usable_w = (width - 2.0 * padding).max(1.0);
        let usable_h = (height - 2.0 * padding).max(1.0);
        let scale = (usable_w / span_x).min(usable_h / span_y);

        let offset_x = padding + (usable_w - span_x * scale) / 2.0;
        let offset_y = padding + (usable_h - span_y * scale) / 2.0;

        let x = offset_x + (lon - self.min_lon) * lon_scale * scale;
        let y = offset_y + (self.max_lat - lat) * scale;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        assert_eq!(haversine(51.5, -0.12, 51.5, -0.12), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // One degree of latitude is ~111.2 km on a 6371 km sphere
        let d = haversine(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = haversine(40.7128, -74.0060, 40.7306, -73.9352);
        let b = haversine(40.7306, -73.9352, 40.7128, -74.0060);
        assert!((a - b).abs() < 1e-6);
        assert!(a > 6_000.0 && a < 6_500.0, "got {a}");
    }

    #[test]
    fn test_elevation_gain_ignores_descents() {
        let gain = elevation_gain([100.0, 105.0, 103.0, 110.0, 90.0]);
        assert!((gain - 12.0).abs() < 1e-9);
        assert_eq!(elevation_gain(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_bounds_and_projection() {
        let bounds = Bounds::of([(10.0, 20.0), (10.01, 20.01), (10.005, 20.0)]).unwrap();
        assert_eq!(bounds.min_lat, 10.0);
        assert_eq!(bounds.max_lon, 20.01);

        let (x, y) = bounds.project(10.01, 20.0, 200.0, 200.0, 10.0);
        assert!(x >= 10.0 && x <= 190.0);
        // Northernmost point sits at the top padding
        assert!((y - 10.0).abs() < 1e-6, "got {y}");
        assert!(Bounds::of(Vec::new()).is_none());
    }
}
