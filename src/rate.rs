//! Rate derivation for cumulative counters.
//!
//! Rates are computed at query time from the stored cumulative samples, never
//! at collection time. A negative delta (counter reset or wrap) counts as no
//! traffic for that interval.

use crate::history::MetricSample;

/// Per-second rate between two chronologically adjacent counter samples.
///
/// Returns 0 when the time delta is not positive or the counter went backwards.
pub fn counter_rate(curr: &MetricSample, prev: &MetricSample) -> f64 {
    let delta_ms = curr.timestamp - prev.timestamp;
    if delta_ms <= 0 {
        return 0.0;
    }
    let delta_value = (curr.value - prev.value).max(0.0);
    delta_value / (delta_ms as f64 / 1000.0)
}

/// Converts a cumulative series into a rate series of the same length.
///
/// The first point has no predecessor and always reports 0.
pub fn derive_rates(series: &[MetricSample]) -> Vec<MetricSample> {
    let mut rates = Vec::with_capacity(series.len());
    if let Some(first) = series.first() {
        rates.push(MetricSample::new(first.timestamp, 0.0));
    }
    rates.extend(
        series
            .windows(2)
            .map(|pair| MetricSample::new(pair[1].timestamp, counter_rate(&pair[1], &pair[0]))),
    );
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seconds: i64, value: f64) -> MetricSample {
        MetricSample::new(seconds * 1000, value)
    }

    #[test]
    fn test_rate_basic() {
        assert_eq!(counter_rate(&sample(2, 100.0), &sample(0, 40.0)), 30.0);
    }

    #[test]
    fn test_rate_reset_clamps_to_zero() {
        assert_eq!(counter_rate(&sample(2, 10.0), &sample(0, 50.0)), 0.0);
    }

    #[test]
    fn test_rate_zero_time_delta() {
        assert_eq!(counter_rate(&sample(3, 5.0), &sample(3, 5.0)), 0.0);
        assert_eq!(counter_rate(&sample(3, 500.0), &sample(3, 5.0)), 0.0);
    }

    #[test]
    fn test_rate_negative_time_delta() {
        assert_eq!(counter_rate(&sample(1, 100.0), &sample(2, 0.0)), 0.0);
    }

    #[test]
    fn test_rate_sub_second_interval() {
        let prev = MetricSample::new(0, 0.0);
        let curr = MetricSample::new(500, 100.0);
        assert_eq!(counter_rate(&curr, &prev), 200.0);
    }

    #[test]
    fn test_derive_rates_series() {
        let series = vec![
            sample(0, 1000.0),
            sample(5, 1500.0),
            sample(10, 1200.0),
            sample(15, 2200.0),
        ];
        let rates = derive_rates(&series);
        let values: Vec<f64> = rates.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.0, 100.0, 0.0, 200.0]);
        let stamps: Vec<i64> = rates.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![0, 5000, 10000, 15000]);
    }

    #[test]
    fn test_derive_rates_empty_and_single() {
        assert!(derive_rates(&[]).is_empty());
        assert_eq!(derive_rates(&[sample(7, 99.0)]), vec![sample(7, 0.0)]);
    }
}
