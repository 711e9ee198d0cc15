use geo::{GeodesicDistance, Point};

use crate::models::Coordinates;

/// Meters in one statute mile
const METERS_PER_MILE: f64 = 1609.344;

/// Distance function used by the location set builder
pub type DistanceFn = fn(Coordinates, Coordinates) -> f64;

/// Geodesic distance between two points in miles
///
/// Uses Karney's algorithm on the WGS-84 ellipsoid, so results agree with
/// common geodesy libraries to well under a meter.
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Non-negative distance in statute miles
#[inline]
pub fn geodesic_miles(a: Coordinates, b: Coordinates) -> f64 {
    let from = Point::new(a.longitude, a.latitude);
    let to = Point::new(b.longitude, b.latitude);

    from.geodesic_distance(&to).abs() / METERS_PER_MILE
}
