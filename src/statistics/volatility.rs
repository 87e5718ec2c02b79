//! Three non-interchangeable dispersion measures over the workload channels.

use std::num::NonZeroUsize;

use average::{Estimate, Mean, Variance};
use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::core::{Channel, Channels, StatisticsError, TimedValue, Workload};

/// Population standard deviation of the means of consecutive time windows.
///
/// A window starts at its first sample and takes every following sample not later than
/// `window` from that start. Samples without a timestamp stay in the current window.
pub fn windowed_std_dev(
    channel: Channel,
    series: &[TimedValue],
    window: TimeDelta,
) -> Result<f64, StatisticsError> {
    if series.is_empty() {
        return Err(StatisticsError::EmptySeries(channel));
    }

    let mut window_means = Vec::new();
    let mut current = Mean::new();
    let mut window_start: Option<DateTime<Utc>> = None;

    for sample in series {
        if let (Some(start), Some(timestamp)) = (window_start, sample.timestamp)
            && timestamp - start > window
        {
            window_means.push(current.mean());
            current = Mean::new();
            window_start = Some(timestamp);
        } else if window_start.is_none() {
            window_start = sample.timestamp;
        }
        current.add(sample.value);
    }
    window_means.push(current.mean());

    let variance: Variance = window_means.into_iter().collect();
    Ok(variance.population_variance().sqrt())
}

/// Worst-case swing from the mean, in percent of the mean.
pub fn range_volatility(channel: Channel, series: &[TimedValue]) -> Result<f64, StatisticsError> {
    let Some((min, max)) = series.iter().map(|sample| sample.value).minmax().into_option() else {
        return Err(StatisticsError::EmptySeries(channel));
    };
    let mean: Mean = series.iter().map(|sample| sample.value).collect();
    let mean = mean.mean();
    if mean <= 0.0 || mean.is_nan() {
        return Err(StatisticsError::UndefinedRatio {
            what: "range volatility",
            denominator: mean,
        });
    }
    let upward = (100.0 * (max - mean) / mean).round();
    let downward = (100.0 * (mean - min) / mean).round();
    Ok(upward.max(downward))
}

/// Element-wise sum of the three channels, stamped with the first set timestamp among them.
pub fn merged_series(workload: &Workload) -> Result<Vec<TimedValue>, StatisticsError> {
    workload.ensure_synchronized()?;
    Ok(workload
        .loads
        .a
        .iter()
        .zip(&workload.loads.b)
        .zip(&workload.loads.c)
        .map(|((a, b), c)| {
            TimedValue::new(
                a.timestamp.or(b.timestamp).or(c.timestamp),
                a.value + b.value + c.value,
            )
        })
        .collect())
}

/// Sample standard deviation of the averages of fixed-size index windows over the merged series.
pub fn interval_std_dev(workload: &Workload, size: NonZeroUsize) -> Result<f64, StatisticsError> {
    let merged = merged_series(workload)?;
    if merged.is_empty() {
        return Err(StatisticsError::EmptySeries(Channel::A));
    }
    let averages = merged
        .chunks(size.get())
        .map(|chunk| chunk.iter().map(|sample| sample.value).collect::<Mean>().mean())
        .collect_vec();
    if averages.len() < 2 {
        return Err(StatisticsError::InsufficientSamples { got: averages.len(), need: 2 });
    }
    let variance: Variance = averages.into_iter().collect();
    Ok(variance.sample_variance().sqrt())
}

/// Difference of a window sum from the preceding window sum.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct IntervalChange {
    /// Timestamp of the last sample in the window.
    pub timestamp: Option<DateTime<Utc>>,

    pub change: f64,
}

/// Change of the merged series sum between consecutive fixed-size index windows.
///
/// The first window has no predecessor and produces no record.
pub fn interval_changes(
    workload: &Workload,
    size: NonZeroUsize,
) -> Result<Vec<IntervalChange>, StatisticsError> {
    Ok(merged_series(workload)?
        .chunks(size.get())
        .map(|chunk| {
            let timestamp = chunk.last().and_then(|sample| sample.timestamp);
            (timestamp, chunk.iter().map(|sample| sample.value).sum::<f64>())
        })
        .tuple_windows()
        .map(|((_, previous_sum), (timestamp, sum))| IntervalChange {
            timestamp,
            change: sum - previous_sum,
        })
        .collect())
}

/// Results of every estimator for a single workload.
#[must_use]
#[derive(Debug)]
pub struct VolatilityFigures {
    pub windowed: Result<Channels<f64>, StatisticsError>,
    pub range: Result<Channels<f64>, StatisticsError>,
    pub interval: Result<f64, StatisticsError>,
    pub changes: Result<Vec<IntervalChange>, StatisticsError>,
}

impl VolatilityFigures {
    pub fn estimate(workload: &Workload, window: TimeDelta, interval_size: NonZeroUsize) -> Self {
        Self {
            windowed: workload
                .loads
                .as_ref()
                .labeled()
                .map(|(channel, series)| windowed_std_dev(channel, series, window))
                .transpose(),
            range: workload
                .loads
                .as_ref()
                .labeled()
                .map(|(channel, series)| range_volatility(channel, series))
                .transpose(),
            interval: interval_std_dev(workload, interval_size),
            changes: interval_changes(workload, interval_size),
        }
    }

    /// Errors of the failed estimators, labeled with the estimator name.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &StatisticsError)> {
        [
            ("windowed", self.windowed.as_ref().err()),
            ("range", self.range.as_ref().err()),
            ("interval", self.interval.as_ref().err()),
            ("changes", self.changes.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(estimator, error)| error.map(|error| (estimator, error)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap().to_utc()
    }

    fn minutely(values: &[f64]) -> Vec<TimedValue> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| TimedValue::at(start() + TimeDelta::minutes(i as i64), *value))
            .collect()
    }

    fn size(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap()
    }

    #[test]
    fn test_windowed_single_sample() {
        let std_dev =
            windowed_std_dev(Channel::A, &minutely(&[42.0]), TimeDelta::minutes(5)).unwrap();
        assert_abs_diff_eq!(std_dev, 0.0);
    }

    #[test]
    fn test_windowed_empty() {
        assert!(matches!(
            windowed_std_dev(Channel::B, &[], TimeDelta::minutes(5)),
            Err(StatisticsError::EmptySeries(Channel::B)),
        ));
    }

    #[test]
    fn test_windowed_inclusive_window() {
        // Minutes 0..=5 form the first window, 6..=11 the second one:
        let mut values = vec![1.0; 6];
        values.extend([3.0; 6]);
        let std_dev =
            windowed_std_dev(Channel::A, &minutely(&values), TimeDelta::minutes(5)).unwrap();
        assert_abs_diff_eq!(std_dev, 1.0);
    }

    #[test]
    fn test_windowed_unset_timestamps_stay_in_window() {
        let mut series = minutely(&[2.0, 4.0]);
        series.push(TimedValue::unset(3.0));
        let std_dev = windowed_std_dev(Channel::A, &series, TimeDelta::minutes(5)).unwrap();
        assert_abs_diff_eq!(std_dev, 0.0);
    }

    #[test]
    fn test_range_volatility() {
        // Mean 4, max swing up is 50 %, down is 75 %:
        let volatility = range_volatility(Channel::A, &minutely(&[1.0, 5.0, 6.0])).unwrap();
        assert_abs_diff_eq!(volatility, 75.0);
    }

    #[test]
    fn test_range_volatility_zero_mean() {
        assert!(matches!(
            range_volatility(Channel::C, &minutely(&[0.0])),
            Err(StatisticsError::UndefinedRatio { .. }),
        ));
        assert!(matches!(
            range_volatility(Channel::C, &[]),
            Err(StatisticsError::EmptySeries(Channel::C)),
        ));
    }

    #[test]
    fn test_interval_std_dev() {
        let workload = Workload::new(
            "W1",
            Channels::new(
                minutely(&[1.0, 1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 3.0, 3.0]),
                minutely(&[0.0; 10]),
                minutely(&[0.0; 10]),
            ),
            0.0,
        );
        // Window averages are 1 and 3, the sample variance is 2:
        let std_dev = interval_std_dev(&workload, size(5)).unwrap();
        assert_abs_diff_eq!(std_dev, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_interval_std_dev_single_window() {
        let workload = Workload::new(
            "W1",
            Channels::new(minutely(&[1.0; 3]), minutely(&[1.0; 3]), minutely(&[1.0; 3])),
            0.0,
        );
        assert!(matches!(
            interval_std_dev(&workload, size(5)),
            Err(StatisticsError::InsufficientSamples { got: 1, need: 2 }),
        ));
    }

    #[test]
    fn test_interval_changes_of_equal_values() {
        let workload = Workload::new(
            "W1",
            Channels::new(minutely(&[2.0; 10]), minutely(&[2.0; 10]), minutely(&[2.0; 10])),
            0.0,
        );
        let changes = interval_changes(&workload, size(5)).unwrap();
        assert_eq!(changes.len(), 1);
        assert_abs_diff_eq!(changes[0].change, 0.0);
        assert_eq!(changes[0].timestamp, Some(start() + TimeDelta::minutes(9)));
    }

    #[test]
    fn test_interval_changes_partial_last_window() {
        let workload = Workload::new(
            "W1",
            Channels::new(minutely(&[1.0, 1.0, 5.0]), minutely(&[0.0; 3]), minutely(&[0.0; 3])),
            0.0,
        );
        let changes = interval_changes(&workload, size(2)).unwrap();
        assert_eq!(changes.len(), 1);
        assert_abs_diff_eq!(changes[0].change, 3.0);
    }

    #[test]
    fn test_merged_series_falls_back_to_set_timestamps() {
        let workload = Workload::new(
            "W1",
            Channels::new(minutely(&[1.0; 2]), minutely(&[1.0; 10]), minutely(&[1.0; 10])),
            0.0,
        )
        .normalized();
        let changes = interval_changes(&workload, size(5)).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].timestamp, Some(start() + TimeDelta::minutes(9)));
        assert_abs_diff_eq!(changes[0].change, 0.0);
    }

    #[test]
    fn test_unsynchronized_channels() {
        let workload = Workload::new(
            "W1",
            Channels::new(minutely(&[1.0, 2.0]), minutely(&[1.0]), minutely(&[1.0])),
            0.0,
        );
        assert!(matches!(
            interval_changes(&workload, size(5)),
            Err(StatisticsError::UnsynchronizedChannels { .. }),
        ));
    }

    #[test]
    fn test_failures() {
        let workload = Workload::new("W1", Channels::new(vec![], vec![], vec![]), 0.0);
        let figures = VolatilityFigures::estimate(&workload, TimeDelta::minutes(5), size(5));
        let estimators: Vec<_> = figures.failures().map(|(estimator, _)| estimator).collect();
        assert_eq!(estimators, ["windowed", "range", "interval"]);
    }
}
