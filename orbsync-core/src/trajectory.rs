//! Trajectory sample and derived metric types.
//!
//! Output-only: the core never persists these. A sample is a pure function
//! of `(OrbitalElementRecord, timestamp)`.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// One propagated position/velocity sample with derived geodetic fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub object_id: String,
    pub timestamp: Timestamp,
    /// Inertial position, kilometers.
    pub position_km: [f64; 3],
    /// Inertial velocity, kilometers per second.
    pub velocity_km_s: [f64; 3],
    pub altitude_km: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Set when the sample lies beyond the element set's accuracy horizon.
    pub degraded_accuracy: bool,
}

impl TrajectorySample {
    /// Geocentric distance in kilometers.
    pub fn radius_km(&self) -> f64 {
        let [x, y, z] = self.position_km;
        (x * x + y * y + z * z).sqrt()
    }

    /// Speed in kilometers per second.
    pub fn speed_km_s(&self) -> f64 {
        let [vx, vy, vz] = self.velocity_km_s;
        (vx * vx + vy * vy + vz * vz).sqrt()
    }
}

/// Summary metrics over a propagated sample series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetrics {
    /// Total path length in kilometers, summed over consecutive samples.
    pub total_distance_km: f64,
    /// Time span covered by the series, hours.
    pub duration_hours: f64,
    /// Mean speed over the series, km/h.
    pub avg_speed_km_h: f64,
    pub min_altitude_km: f64,
    pub max_altitude_km: f64,
    /// Number of samples flagged with degraded accuracy.
    pub degraded_samples: usize,
}
