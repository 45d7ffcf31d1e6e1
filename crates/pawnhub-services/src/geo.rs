//! Distance and travel-time estimates for the store map.
//!
//! Coordinates are taken as given; range checks are the caller's job.

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Assumed average driving speed in town.
const AVERAGE_SPEED_MPH: f64 = 30.0;

/// Great-circle (haversine) distance in miles, rounded to one decimal.
pub fn calculate_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 near antipodes
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_MILES * c * 10.0).round() / 10.0
}

/// Human-readable driving time for a distance in miles.
pub fn estimate_travel_time(distance: f64) -> String {
    let mut minutes = (distance / AVERAGE_SPEED_MPH * 60.0).round() as u64;
    if minutes == 0 && distance > 0.0 {
        minutes = 1;
    }

    if minutes < 60 {
        return format!("{} min", minutes);
    }

    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{} hr", hours),
        rest => format!("{} hr {} min", hours, rest),
    }
}
