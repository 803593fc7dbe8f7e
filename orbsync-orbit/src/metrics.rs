//! Summary metrics over a propagated sample series.

use orbsync_core::{TrajectoryMetrics, TrajectorySample};

/// Summarize a sample series. Needs at least two samples to define a path;
/// returns `None` otherwise.
///
/// Distance is the chord-length sum over consecutive samples, so a coarse
/// time grid understates the true arc length.
pub fn trajectory_metrics(samples: &[TrajectorySample]) -> Option<TrajectoryMetrics> {
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(f), Some(l)) if samples.len() >= 2 => (f, l),
        _ => return None,
    };

    let total_distance_km: f64 = samples
        .windows(2)
        .map(|pair| {
            let [ax, ay, az] = pair[0].position_km;
            let [bx, by, bz] = pair[1].position_km;
            ((bx - ax).powi(2) + (by - ay).powi(2) + (bz - az).powi(2)).sqrt()
        })
        .sum();

    let duration_hours = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 3_600_000.0;
    let avg_speed_km_h = if duration_hours > 0.0 {
        total_distance_km / duration_hours
    } else {
        0.0
    };

    let mut min_altitude_km = f64::INFINITY;
    let mut max_altitude_km = f64::NEG_INFINITY;
    let mut degraded_samples = 0;
    for sample in samples {
        min_altitude_km = min_altitude_km.min(sample.altitude_km);
        max_altitude_km = max_altitude_km.max(sample.altitude_km);
        if sample.degraded_accuracy {
            degraded_samples += 1;
        }
    }

    Some(TrajectoryMetrics {
        total_distance_km,
        duration_hours,
        avg_speed_km_h,
        min_altitude_km,
        max_altitude_km,
        degraded_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use orbsync_core::Timestamp;

    fn sample(at: Timestamp, position_km: [f64; 3], altitude_km: f64) -> TrajectorySample {
        TrajectorySample {
            object_id: "25544".to_string(),
            timestamp: at,
            position_km,
            velocity_km_s: [0.0, 0.0, 0.0],
            altitude_km,
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            degraded_accuracy: false,
        }
    }

    #[test]
    fn test_too_few_samples_yields_none() {
        let at: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        assert!(trajectory_metrics(&[]).is_none());
        assert!(trajectory_metrics(&[sample(at, [7000.0, 0.0, 0.0], 420.0)]).is_none());
    }

    #[test]
    fn test_straight_line_distance_and_speed() {
        let start: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        let samples = vec![
            sample(start, [0.0, 0.0, 0.0], 400.0),
            sample(start + Duration::hours(1), [3000.0, 4000.0, 0.0], 420.0),
            sample(start + Duration::hours(2), [6000.0, 8000.0, 0.0], 410.0),
        ];
        let metrics = trajectory_metrics(&samples).unwrap();
        assert!((metrics.total_distance_km - 10_000.0).abs() < 1e-9);
        assert!((metrics.duration_hours - 2.0).abs() < 1e-9);
        assert!((metrics.avg_speed_km_h - 5_000.0).abs() < 1e-9);
        assert_eq!(metrics.min_altitude_km, 400.0);
        assert_eq!(metrics.max_altitude_km, 420.0);
        assert_eq!(metrics.degraded_samples, 0);
    }

    #[test]
    fn test_degraded_samples_counted() {
        let start: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        let mut samples = vec![
            sample(start, [7000.0, 0.0, 0.0], 400.0),
            sample(start + Duration::hours(1), [0.0, 7000.0, 0.0], 405.0),
        ];
        samples[1].degraded_accuracy = true;
        let metrics = trajectory_metrics(&samples).unwrap();
        assert_eq!(metrics.degraded_samples, 1);
    }
}
