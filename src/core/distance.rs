use crate::models::GeoPoint;
use geo::{HaversineDistance, Point};

/// Great-circle distance between two points in kilometers
///
/// # Arguments
/// * `from` - First point (degrees)
/// * `to` - Second point (degrees)
#[inline]
pub fn haversine_distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    // geo points are (x = lon, y = lat)
    let a = Point::new(from.lon, from.lat);
    let b = Point::new(to.lon, to.lat);

    a.haversine_distance(&b) / 1000.0
}

/// Check that a point carries usable coordinates
#[inline]
pub fn is_valid_point(point: GeoPoint) -> bool {
    point.lat.is_finite()
        && point.lon.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lon)
}
