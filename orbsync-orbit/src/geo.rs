//! Geodetic conversion for inertial positions.
//!
//! Spherical-Earth model: geocentric latitude and an altitude measured
//! against the equatorial radius. Accurate to a fraction of a degree, which
//! is sufficient for ground-track display; swap in an ellipsoidal model if
//! sub-kilometer geodesy is ever needed.

use crate::propagate::EARTH_RADIUS_KM;
use orbsync_core::Timestamp;

/// Geodetic coordinates of one inertial position at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPoint {
    pub latitude_deg: f64,
    /// Normalized to (-180, 180].
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Convert an inertial position to geodetic coordinates.
///
/// Longitude depends on the instant through Earth rotation (GMST).
pub fn geodetic_of(position_km: [f64; 3], at: Timestamp) -> GeodeticPoint {
    let [x, y, z] = position_km;
    let radius = (x * x + y * y + z * z).sqrt();

    let latitude_deg = if radius > 0.0 {
        (z / radius).asin().to_degrees()
    } else {
        0.0
    };

    let inertial_lon = y.atan2(x).to_degrees();
    let longitude_deg = normalize_longitude(inertial_lon - gmst_degrees(at));

    GeodeticPoint {
        latitude_deg,
        longitude_deg,
        altitude_km: radius - EARTH_RADIUS_KM,
    }
}

/// Greenwich mean sidereal time in degrees, from the IAU 1982 polynomial.
fn gmst_degrees(at: Timestamp) -> f64 {
    let unix_seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_millis()) / 1000.0;
    let julian_date = 2_440_587.5 + unix_seconds / 86_400.0;
    let d = julian_date - 2_451_545.0;
    let t = d / 36_525.0;

    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    gmst.rem_euclid(360.0)
}

fn normalize_longitude(mut lon: f64) -> f64 {
    lon = lon.rem_euclid(360.0);
    if lon > 180.0 {
        lon -= 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equatorial_point_has_zero_latitude() {
        let at = "2024-03-01T12:00:00Z".parse().unwrap();
        let point = geodetic_of([7000.0, 0.0, 0.0], at);
        assert!(point.latitude_deg.abs() < 1e-12);
        assert!((point.altitude_km - (7000.0 - EARTH_RADIUS_KM)).abs() < 1e-9);
    }

    #[test]
    fn test_polar_point_has_ninety_latitude() {
        let at = "2024-03-01T12:00:00Z".parse().unwrap();
        let point = geodetic_of([0.0, 0.0, 7000.0], at);
        assert!((point.latitude_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_normalized() {
        let at = "2024-03-01T12:00:00Z".parse().unwrap();
        for x in [-7000.0, 7000.0] {
            for y in [-7000.0, 0.0, 7000.0] {
                let point = geodetic_of([x, y, 100.0], at);
                assert!(point.longitude_deg > -180.0 && point.longitude_deg <= 180.0);
            }
        }
    }

    #[test]
    fn test_gmst_advances_with_time() {
        let t0: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        let t1 = t0 + chrono::Duration::hours(1);
        let delta = (gmst_degrees(t1) - gmst_degrees(t0)).rem_euclid(360.0);
        // Sidereal rate: a hair over 15 degrees per hour.
        assert!((delta - 15.041).abs() < 0.01, "delta {}", delta);
    }
}
