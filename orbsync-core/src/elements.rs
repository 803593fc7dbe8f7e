//! Orbital element records.
//!
//! The minimal orbital-state snapshot needed for propagation: mean elements
//! at an epoch plus the B* drag term. Everywhere else in the system this is
//! opaque cache payload; only the propagation engine interprets it.

use crate::error::PropagationError;
use crate::Timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mean orbital elements for one tracked object at an epoch.
///
/// Angles are in degrees as published upstream; mean motion is in
/// revolutions per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementRecord {
    pub object_id: String,
    pub epoch: Timestamp,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub eccentricity: f64,
    /// Degrees.
    pub inclination: f64,
    /// Right ascension of the ascending node, degrees.
    pub raan: f64,
    /// Argument of perigee, degrees.
    pub arg_perigee: f64,
    /// Degrees.
    pub mean_anomaly: f64,
    /// B* drag term, 1/earth-radii.
    pub bstar: f64,
}

impl OrbitalElementRecord {
    /// Validate physical plausibility of the element set.
    ///
    /// Non-physical eccentricity or mean motion fails fast rather than being
    /// silently clamped downstream.
    pub fn validate(&self) -> Result<(), PropagationError> {
        if !self.mean_motion.is_finite() || self.mean_motion <= 0.0 {
            return Err(PropagationError::InvalidElementSet {
                object_id: self.object_id.clone(),
                reason: format!("mean motion {} rev/day is non-physical", self.mean_motion),
            });
        }
        if !self.eccentricity.is_finite() || !(0.0..1.0).contains(&self.eccentricity) {
            return Err(PropagationError::InvalidElementSet {
                object_id: self.object_id.clone(),
                reason: format!(
                    "eccentricity {} outside [0, 1) for a bound orbit",
                    self.eccentricity
                ),
            });
        }
        if !(0.0..=180.0).contains(&self.inclination) {
            return Err(PropagationError::InvalidElementSet {
                object_id: self.object_id.clone(),
                reason: format!("inclination {} deg outside [0, 180]", self.inclination),
            });
        }
        for (name, value) in [
            ("raan", self.raan),
            ("arg_perigee", self.arg_perigee),
            ("mean_anomaly", self.mean_anomaly),
            ("bstar", self.bstar),
        ] {
            if !value.is_finite() {
                return Err(PropagationError::InvalidElementSet {
                    object_id: self.object_id.clone(),
                    reason: format!("{} is not finite", name),
                });
            }
        }
        Ok(())
    }

    /// Parse from an upstream general-perturbations record.
    ///
    /// Upstream serializes numeric fields inconsistently (sometimes JSON
    /// numbers, sometimes strings), so both forms are accepted.
    pub fn from_gp_record(record: &Value) -> Result<Self, PropagationError> {
        let object_id = field_str(record, "NORAD_CAT_ID")?;
        let epoch_raw = field_str(record, "EPOCH")?;
        let epoch = parse_epoch(&epoch_raw).ok_or_else(|| PropagationError::InvalidElementSet {
            object_id: object_id.clone(),
            reason: format!("unparseable epoch {:?}", epoch_raw),
        })?;

        let parsed = Self {
            object_id: object_id.clone(),
            epoch,
            mean_motion: field_f64(record, "MEAN_MOTION", &object_id)?,
            eccentricity: field_f64(record, "ECCENTRICITY", &object_id)?,
            inclination: field_f64(record, "INCLINATION", &object_id)?,
            raan: field_f64(record, "RA_OF_ASC_NODE", &object_id)?,
            arg_perigee: field_f64(record, "ARG_OF_PERICENTER", &object_id)?,
            mean_anomaly: field_f64(record, "MEAN_ANOMALY", &object_id)?,
            bstar: field_f64(record, "BSTAR", &object_id).unwrap_or(0.0),
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

fn field_str(record: &Value, field: &str) -> Result<String, PropagationError> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(PropagationError::InvalidElementSet {
            object_id: record
                .get("NORAD_CAT_ID")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string(),
            reason: format!("missing field {}", field),
        }),
    }
}

fn field_f64(record: &Value, field: &str, object_id: &str) -> Result<f64, PropagationError> {
    let value = match record.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.ok_or_else(|| PropagationError::InvalidElementSet {
        object_id: object_id.to_string(),
        reason: format!("missing or non-numeric field {}", field),
    })
}

/// Upstream epochs come as RFC 3339 or as a space-separated variant.
fn parse_epoch(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
