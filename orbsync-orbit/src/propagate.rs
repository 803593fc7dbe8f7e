//! Orbital-element propagation.
//!
//! A first-order secular perturbation model: Keplerian two-body motion with
//! J2 secular drift of the node, perigee, and mean anomaly, plus a B*-scaled
//! secular drag term on the mean anomaly. Pure function of
//! `(record, timestamp)` with no shared state: repeated calls yield
//! bit-identical output.
//!
//! Element-set accuracy decays with time since epoch; samples farther from
//! epoch than the accuracy horizon carry `degraded_accuracy = true` instead
//! of being silently returned or rejected.

use crate::geo::geodetic_of;
use orbsync_core::{OrbitalElementRecord, PropagationError, Timestamp, TrajectorySample};

/// Standard gravitational parameter of Earth, km^3/s^2.
const MU_KM3_S2: f64 = 398_600.4418;

/// Earth equatorial radius, km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Second zonal harmonic of Earth's gravity field.
const J2: f64 = 1.082_626_68e-3;

/// Newton iterations for the Kepler solve. A fixed count keeps the solver
/// branch-free and deterministic; convergence for bound orbits (e < 1) is
/// well inside this budget.
const KEPLER_ITERATIONS: usize = 12;

const SECONDS_PER_DAY: f64 = 86_400.0;
const TAU: f64 = std::f64::consts::TAU;

/// Lazy, restartable sample sequence over a fixed set of instants.
///
/// Validation happens once in [`propagate`]; iteration itself only fails on
/// a non-finite numerical state. Cloning yields an independent cursor, so a
/// clone taken before iteration restarts the sequence.
#[derive(Debug, Clone)]
pub struct Propagation {
    elements: OrbitalElementRecord,
    timestamps: Vec<Timestamp>,
    horizon_days: i64,
    cursor: usize,
}

impl Propagation {
    /// Reset the cursor to the first instant.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl Iterator for Propagation {
    type Item = Result<TrajectorySample, PropagationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let at = *self.timestamps.get(self.cursor)?;
        self.cursor += 1;
        Some(sample_at(&self.elements, at, self.horizon_days))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.timestamps.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

/// Build a lazy sample sequence for the given instants.
///
/// Fails fast on a non-physical element set; per-sample numerical failures
/// surface from the iterator instead.
pub fn propagate(
    elements: &OrbitalElementRecord,
    timestamps: &[Timestamp],
    horizon_days: i64,
) -> Result<Propagation, PropagationError> {
    elements.validate()?;
    Ok(Propagation {
        elements: elements.clone(),
        timestamps: timestamps.to_vec(),
        horizon_days,
        cursor: 0,
    })
}

/// Eager variant: propagate every instant, failing on the first error.
pub fn propagate_all(
    elements: &OrbitalElementRecord,
    timestamps: &[Timestamp],
    horizon_days: i64,
) -> Result<Vec<TrajectorySample>, PropagationError> {
    propagate(elements, timestamps, horizon_days)?.collect()
}

fn sample_at(
    elements: &OrbitalElementRecord,
    at: Timestamp,
    horizon_days: i64,
) -> Result<TrajectorySample, PropagationError> {
    let dt_s = (at - elements.epoch).num_milliseconds() as f64 / 1000.0;

    // Mean motion in rad/s and the derived semi-major axis.
    let n0 = elements.mean_motion * TAU / SECONDS_PER_DAY;
    let a = (MU_KM3_S2 / (n0 * n0)).cbrt();
    let e = elements.eccentricity;
    let inc = elements.inclination.to_radians();
    let p = a * (1.0 - e * e);

    // First-order J2 secular rates, rad/s.
    let j2_base = 1.5 * J2 * n0 * (EARTH_RADIUS_KM / p).powi(2);
    let raan_dot = -j2_base * inc.cos();
    let argp_dot = 0.5 * j2_base * (5.0 * inc.cos().powi(2) - 1.0);
    let m_dot_j2 = 0.5 * j2_base * (1.0 - e * e).sqrt() * (3.0 * inc.cos().powi(2) - 1.0);

    // Crude B*-scaled secular drag: quadratic advance of the mean anomaly as
    // the orbit contracts. rad/s^2.
    let n_dot = 1.5 * elements.bstar * n0 * n0;

    let raan = elements.raan.to_radians() + raan_dot * dt_s;
    let argp = elements.arg_perigee.to_radians() + argp_dot * dt_s;
    let mean_anomaly = (elements.mean_anomaly.to_radians()
        + (n0 + m_dot_j2) * dt_s
        + 0.5 * n_dot * dt_s * dt_s)
        .rem_euclid(TAU);

    let ecc_anomaly = solve_kepler(mean_anomaly, e);
    let true_anomaly = 2.0
        * f64::atan2(
            (1.0 + e).sqrt() * (ecc_anomaly / 2.0).sin(),
            (1.0 - e).sqrt() * (ecc_anomaly / 2.0).cos(),
        );
    let radius = a * (1.0 - e * ecc_anomaly.cos());

    // Perifocal position/velocity, then rotation into the inertial frame.
    let pos_pf = [
        radius * true_anomaly.cos(),
        radius * true_anomaly.sin(),
        0.0,
    ];
    let v_scale = (MU_KM3_S2 / p).sqrt();
    let vel_pf = [
        -v_scale * true_anomaly.sin(),
        v_scale * (e + true_anomaly.cos()),
        0.0,
    ];

    let position_km = perifocal_to_inertial(pos_pf, raan, inc, argp);
    let velocity_km_s = perifocal_to_inertial(vel_pf, raan, inc, argp);

    let finite = position_km.iter().chain(velocity_km_s.iter()).all(|v| v.is_finite());
    if !finite {
        return Err(PropagationError::NonFiniteState {
            object_id: elements.object_id.clone(),
            timestamp: at,
        });
    }

    let geodetic = geodetic_of(position_km, at);
    let degraded_accuracy = dt_s.abs() > horizon_days as f64 * SECONDS_PER_DAY;

    Ok(TrajectorySample {
        object_id: elements.object_id.clone(),
        timestamp: at,
        position_km,
        velocity_km_s,
        altitude_km: geodetic.altitude_km,
        latitude_deg: geodetic.latitude_deg,
        longitude_deg: geodetic.longitude_deg,
        degraded_accuracy,
    })
}

/// Newton-Raphson Kepler solve with a fixed iteration count.
fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut ecc_anomaly = if eccentricity > 0.8 {
        std::f64::consts::PI
    } else {
        mean_anomaly
    };
    for _ in 0..KEPLER_ITERATIONS {
        let f = ecc_anomaly - eccentricity * ecc_anomaly.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * ecc_anomaly.cos();
        ecc_anomaly -= f / f_prime;
    }
    ecc_anomaly
}

/// Rotate a perifocal vector into the inertial frame: R3(-raan) R1(-inc)
/// R3(-argp).
fn perifocal_to_inertial(v: [f64; 3], raan: f64, inc: f64, argp: f64) -> [f64; 3] {
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_i, cos_i) = inc.sin_cos();
    let (sin_w, cos_w) = argp.sin_cos();

    let r11 = cos_o * cos_w - sin_o * sin_w * cos_i;
    let r12 = -cos_o * sin_w - sin_o * cos_w * cos_i;
    let r13 = sin_o * sin_i;
    let r21 = sin_o * cos_w + cos_o * sin_w * cos_i;
    let r22 = -sin_o * sin_w + cos_o * cos_w * cos_i;
    let r23 = -cos_o * sin_i;
    let r31 = sin_w * sin_i;
    let r32 = cos_w * sin_i;
    let r33 = cos_i;

    [
        r11 * v[0] + r12 * v[1] + r13 * v[2],
        r21 * v[0] + r22 * v[1] + r23 * v[2],
        r31 * v[0] + r32 * v[1] + r33 * v[2],
    ]
}
