//! Z-score anomaly detection over parameter time series.
//!
//! Scoring is leave-one-out: each point is compared against the mean and
//! standard deviation of the *rest* of the series (or window), so a single
//! large outlier cannot inflate the spread it is measured against. A point
//! whose deviation exceeds `threshold` standard deviations is flagged; when
//! the rest has zero variance, any deviation at all is flagged.

use orbsync_core::Timestamp;

/// Minimum series length before any point can be flagged. With fewer points
/// there is no meaningful spread estimate.
const MIN_SERIES_LEN: usize = 3;

/// Flag statistical outliers over the whole series.
///
/// Returns the indices of flagged points, in order. A series with fewer than
/// two distinct values yields no anomalies.
pub fn detect(series: &[(Timestamp, f64)], threshold: f64) -> Vec<usize> {
    if series.len() < MIN_SERIES_LEN || !has_two_distinct(series) {
        return Vec::new();
    }

    (0..series.len())
        .filter(|&i| is_outlier(series, i, threshold))
        .collect()
}

/// Flag outliers using a trailing window of `window` samples ending at each
/// point (the point itself included). Points earlier than a full window are
/// scored against the partial prefix. Same leave-one-out scoring as
/// [`detect`].
pub fn detect_windowed(series: &[(Timestamp, f64)], threshold: f64, window: usize) -> Vec<usize> {
    if series.len() < MIN_SERIES_LEN || window < MIN_SERIES_LEN || !has_two_distinct(series) {
        return Vec::new();
    }

    (0..series.len())
        .filter(|&i| {
            let start = i.saturating_sub(window - 1);
            let slice = &series[start..=i];
            slice.len() >= MIN_SERIES_LEN && is_outlier(slice, i - start, threshold)
        })
        .collect()
}

fn is_outlier(series: &[(Timestamp, f64)], index: usize, threshold: f64) -> bool {
    let value = series[index].1;
    let rest: Vec<f64> = series
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, (_, v))| *v)
        .collect();

    let mean = rest.iter().sum::<f64>() / rest.len() as f64;
    let variance = rest.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / rest.len() as f64;
    let std_dev = variance.sqrt();
    let deviation = (value - mean).abs();

    if std_dev == 0.0 {
        // The rest is constant; any departure from it is anomalous.
        deviation > 0.0
    } else {
        deviation / std_dev > threshold
    }
}

fn has_two_distinct(series: &[(Timestamp, f64)]) -> bool {
    series
        .first()
        .map(|(_, first)| series.iter().any(|(_, v)| v != first))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series_of(values: &[f64]) -> Vec<(Timestamp, f64)> {
        let start: Timestamp = "2024-03-01T00:00:00Z".parse().unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Duration::hours(i as i64), v))
            .collect()
    }

    #[test]
    fn test_single_spike_flagged() {
        let flagged = detect(&series_of(&[10.0, 10.0, 10.0, 10.0, 100.0]), 3.0);
        assert_eq!(flagged, vec![4]);
    }

    #[test]
    fn test_constant_series_flags_nothing() {
        assert!(detect(&series_of(&[5.0, 5.0, 5.0, 5.0]), 3.0).is_empty());
    }

    #[test]
    fn test_empty_and_short_series() {
        assert!(detect(&[], 3.0).is_empty());
        assert!(detect(&series_of(&[1.0, 100.0]), 3.0).is_empty());
    }

    #[test]
    fn test_mild_noise_not_flagged() {
        let flagged = detect(&series_of(&[10.0, 10.5, 9.5, 10.2, 9.8, 10.1]), 3.0);
        assert!(flagged.is_empty(), "flagged {:?}", flagged);
    }

    #[test]
    fn test_spike_in_middle() {
        let flagged = detect(&series_of(&[10.0, 10.0, 500.0, 10.0, 10.0]), 3.0);
        assert_eq!(flagged, vec![2]);
    }

    #[test]
    fn test_windowed_flags_local_spike() {
        // A level shift is normal to the whole series but anomalous locally.
        let mut values = vec![10.0; 10];
        values.push(200.0);
        values.extend(vec![10.0; 5]);
        let flagged = detect_windowed(&series_of(&values), 3.0, 6);
        assert!(flagged.contains(&10), "flagged {:?}", flagged);
    }

    #[test]
    fn test_windowed_rejects_tiny_window() {
        assert!(detect_windowed(&series_of(&[1.0, 2.0, 50.0, 2.0]), 3.0, 2).is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_constant_series_never_flags(value in -1e6f64..1e6, len in 0usize..32) {
                let values = vec![value; len];
                prop_assert!(detect(&series_of(&values), 3.0).is_empty());
            }

            #[test]
            fn prop_flagged_indices_in_bounds(values in prop::collection::vec(-1e3f64..1e3, 0..48), threshold in 0.5f64..6.0) {
                let series = series_of(&values);
                for index in detect(&series, threshold) {
                    prop_assert!(index < series.len());
                }
            }

            #[test]
            fn prop_detect_deterministic(values in prop::collection::vec(-1e3f64..1e3, 0..32)) {
                let series = series_of(&values);
                prop_assert_eq!(detect(&series, 3.0), detect(&series, 3.0));
            }
        }
    }
}
