//! # Geographic Utilities
//!
//! Core geographic computations used by the journey geometry.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points, in km |
//! | [`haversine_distance_with_radius`] | Same, on a sphere of a given radius |
//! | [`interpolate`] | Linear interpolation in (lat, lng) space |
//! | [`compute_bounds`] | Bounding box of a set of points |
//!
//! ## Example
//!
//! ```rust
//! use trip_journey::{GpsPoint, geo_utils};
//!
//! let chicago = GpsPoint::new(41.8781, -87.6298);
//! let indianapolis = GpsPoint::new(39.7684, -86.1581);
//!
//! let km = geo_utils::haversine_distance(&chicago, &indianapolis);
//! assert!((km - 265.0).abs() < 5.0);
//!
//! let bounds = geo_utils::compute_bounds(&[chicago, indianapolis]).unwrap();
//! assert_eq!(bounds.max_lat, 41.8781);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances assume a spherical Earth. The radius defaults to 6,371 km, which
//! puts one degree of longitude at the equator at about 111.2 km.
//!
//! ### Interpolation
//!
//! [`interpolate`] is linear in degrees, not geodesic. It is only used to
//! thicken rendered polylines.

use geo::{BoundingRect, Coord, MultiPoint, Point};

use crate::{Bounds, GpsPoint};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in kilometres between two GPS points.
///
/// # Example
///
/// ```rust
/// use trip_journey::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(0.0, 0.0);
/// let b = GpsPoint::new(0.0, 1.0);
/// let km = geo_utils::haversine_distance(&a, &b);
/// assert!((km - 111.2).abs() < 0.5);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    haversine_distance_with_radius(p1, p2, EARTH_RADIUS_KM)
}

/// Great-circle distance between two GPS points on a sphere of `radius`.
///
/// The result is in the same unit as `radius`.
pub fn haversine_distance_with_radius(p1: &GpsPoint, p2: &GpsPoint, radius: f64) -> f64 {
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.latitude.to_radians().cos()
            * p2.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

// =============================================================================
// Interpolation
// =============================================================================

/// Point at `ratio` of the way from `from` to `to`, linear in degrees.
#[inline]
pub fn interpolate(from: &GpsPoint, to: &GpsPoint, ratio: f64) -> GpsPoint {
    let a = to_coord(from);
    let b = to_coord(to);
    let c = a + (b - a) * ratio;
    GpsPoint::new(c.y, c.x)
}

// =============================================================================
// Bounding Box / Center Functions
// =============================================================================

/// Compute the bounding box of a set of points.
///
/// Returns `None` for empty input.
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    let multi: MultiPoint<f64> = points.iter().map(|p| Point::from(to_coord(p))).collect();
    let rect = multi.bounding_rect()?;

    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

#[inline]
pub(crate) fn to_coord(p: &GpsPoint) -> Coord<f64> {
    Coord {
        x: p.longitude,
        y: p.latitude,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(41.8781, -87.6298);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_at_equator() {
        let d = haversine_distance(&GpsPoint::new(0.0, 0.0), &GpsPoint::new(0.0, 1.0));
        assert!(approx_eq(d, 111.2, 0.5), "got {}", d);
    }

    #[test]
    fn test_haversine_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        assert!(approx_eq(haversine_distance(&london, &paris), 343.5, 5.0));
    }

    #[test]
    fn test_haversine_custom_radius() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 1.0);
        let km = haversine_distance(&a, &b);
        let m = haversine_distance_with_radius(&a, &b, EARTH_RADIUS_KM * 1000.0);
        assert!(approx_eq(m, km * 1000.0, 1e-6));
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = GpsPoint::new(10.0, 20.0);
        let b = GpsPoint::new(12.0, 16.0);
        let mid = interpolate(&a, &b, 0.5);
        assert!(approx_eq(mid.latitude, 11.0, 1e-12));
        assert!(approx_eq(mid.longitude, 18.0, 1e-12));
        assert_eq!(interpolate(&a, &b, 0.0), a);
    }

    #[test]
    fn test_compute_bounds() {
        let points = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&points).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }
}
