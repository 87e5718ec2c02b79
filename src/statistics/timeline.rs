use std::collections::BTreeMap;

use average::Variance;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    core::{Channel, Channels, Workload},
    prelude::*,
};

/// Collection-wide channel totals at a single instant.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedTimePoint {
    pub timestamp: DateTime<Utc>,
    pub totals: Channels<f64>,
}

impl AggregatedTimePoint {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.totals.total()
    }
}

/// Channel totals per distinct timestamp, sorted by the timestamp.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline(Vec<AggregatedTimePoint>);

impl Timeline {
    /// Sum up every sample of every workload by its timestamp.
    ///
    /// Each workload is accumulated into its own partial map, and the partial maps are then
    /// merged in the collection order. Samples without a timestamp are skipped.
    #[instrument(skip_all, fields(n_workloads = workloads.len()))]
    pub fn reduce(workloads: &[Workload]) -> Self {
        let partials: Vec<BTreeMap<DateTime<Utc>, Channels<f64>>> =
            workloads.par_iter().map(accumulate).collect();

        let mut merged = BTreeMap::<DateTime<Utc>, Channels<f64>>::new();
        for partial in partials {
            for (timestamp, totals) in partial {
                *merged.entry(timestamp).or_default() += totals;
            }
        }
        debug!(n_points = merged.len(), "reduced");

        Self(
            merged
                .into_iter()
                .map(|(timestamp, totals)| AggregatedTimePoint { timestamp, totals })
                .collect(),
        )
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AggregatedTimePoint] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-channel population standard deviation over consecutive blocks of `size` points.
    ///
    /// For every `end` in `size, 2×size, …` below the timeline length, the block is `[end - size, end)`,
    /// and the result is stamped with the timestamp of the point at `end`.
    pub fn block_volatility(&self, size: usize) -> Vec<(DateTime<Utc>, Channels<f64>)> {
        if size == 0 {
            return Vec::new();
        }
        (size..self.0.len())
            .step_by(size)
            .map(|end| {
                let block = &self.0[end - size..end];
                let std_dev = Channels::new(Channel::A, Channel::B, Channel::C).map(|channel| {
                    let variance: Variance =
                        block.iter().map(|point| *point.totals.get(channel)).collect();
                    variance.population_variance().sqrt()
                });
                (self.0[end].timestamp, std_dev)
            })
            .collect()
    }
}

fn accumulate(workload: &Workload) -> BTreeMap<DateTime<Utc>, Channels<f64>> {
    let mut partial = BTreeMap::<DateTime<Utc>, Channels<f64>>::new();
    for (channel, series) in workload.loads.iter() {
        for sample in series {
            if let Some(timestamp) = sample.timestamp {
                *partial.entry(timestamp).or_default().get_mut(channel) += sample.value;
            }
        }
    }
    partial
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeDelta;

    use super::*;
    use crate::core::TimedValue;

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap().to_utc()
            + TimeDelta::minutes(minute)
    }

    #[test]
    fn test_reduce_sums_by_timestamp_and_sorts() {
        let workloads = [
            Workload::new(
                "W1",
                Channels::new(
                    vec![TimedValue::at(at(2), 1.0), TimedValue::at(at(0), 2.0)],
                    vec![TimedValue::at(at(0), 3.0)],
                    vec![TimedValue::unset(100.0)],
                ),
                0.0,
            ),
            Workload::new(
                "W2",
                Channels::new(
                    vec![TimedValue::at(at(0), 10.0)],
                    vec![],
                    vec![TimedValue::at(at(1), 5.0)],
                ),
                0.0,
            ),
        ];
        let timeline = Timeline::reduce(&workloads);

        let timestamps: Vec<_> = timeline.as_slice().iter().map(|point| point.timestamp).collect();
        assert_eq!(timestamps, [at(0), at(1), at(2)]);

        let first = timeline.as_slice()[0].totals;
        assert_abs_diff_eq!(first.a, 12.0);
        assert_abs_diff_eq!(first.b, 3.0);
        assert_abs_diff_eq!(first.c, 0.0);
        assert_abs_diff_eq!(timeline.as_slice()[1].total(), 5.0);
        assert_abs_diff_eq!(timeline.as_slice()[2].total(), 1.0);
    }

    #[test]
    fn test_block_volatility() {
        let workloads: Vec<_> = (0..11)
            .map(|minute| {
                Workload::new(
                    format!("W{minute}"),
                    Channels::new(
                        vec![TimedValue::at(at(minute), if minute % 2 == 0 { 1.0 } else { 3.0 })],
                        vec![TimedValue::at(at(minute), 7.0)],
                        vec![],
                    ),
                    0.0,
                )
            })
            .collect();
        let volatility = Timeline::reduce(&workloads).block_volatility(5);

        // Blocks `[0, 5)` and `[5, 10)`, the 11th point only stamps the second block:
        assert_eq!(volatility.len(), 2);
        assert_eq!(volatility[0].0, at(5));
        assert_eq!(volatility[1].0, at(10));
        // Values 1, 3, 1, 3, 1: mean 1.8, variance 0.96.
        assert_abs_diff_eq!(volatility[0].1.a, 0.96_f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(volatility[0].1.b, 0.0, epsilon = 1e-9);
    }
}
