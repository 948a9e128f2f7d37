//! Display helpers shared by the CLI and the browser client

/// `m:ss` for a non-negative number of seconds
pub fn clock(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{}:{:02}", s / 60, s % 60)
}

/// `h:mm:ss` once an hour is reached, `m:ss` below that
pub fn hms(seconds: i64) -> String {
    let s = seconds.max(0);
    if s >= 3600 {
        format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
    } else {
        clock(s)
    }
}

/// Pace per kilometre as `m:ss`.
///
/// A zero distance divides by one kilometre instead, so an unfinished or
/// distance-less run shows its duration rather than a division error.
pub fn format_pace(duration_seconds: i64, distance_meters: f64) -> String {
    let km = distance_meters / 1000.0;
    let divisor = if km > 0.0 { km } else { 1.0 };
    let per_km = duration_seconds as f64 / divisor;
    let minutes = (per_km / 60.0).floor() as i64;
    let seconds = (per_km % 60.0).floor() as i64;
    format!("{}:{:02}", minutes, seconds)
}

/// Metres rendered as kilometres with two decimals
pub fn km(distance_meters: f64) -> String {
    format!("{:.2}", distance_meters / 1000.0)
}

/// Whole minutes plus remainder seconds, e.g. `42m 7s`
pub fn minutes_seconds(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{}m {}s", s / 60, s % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(125), "2:05");
        assert_eq!(clock(-4), "0:00");
    }

    #[test]
    fn test_hms() {
        assert_eq!(hms(59), "0:59");
        assert_eq!(hms(3600), "1:00:00");
        assert_eq!(hms(3725), "1:02:05");
    }

    #[test]
    fn test_pace() {
        // 25 minutes over 5 km
        assert_eq!(format_pace(1500, 5000.0), "5:00");
        // 4:50/km
        assert_eq!(format_pace(290, 1000.0), "4:50");
        // zero distance falls back to per-one-km
        assert_eq!(format_pace(330, 0.0), "5:30");
    }

    #[test]
    fn test_km_and_minutes() {
        assert_eq!(km(5234.0), "5.23");
        assert_eq!(km(0.0), "0.00");
        assert_eq!(minutes_seconds(2527), "42m 7s");
    }
}
