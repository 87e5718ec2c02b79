use average::Mean;

use crate::core::{
    channel::{Channel, Channels},
    error::StatisticsError,
    timed_value::TimedValue,
};

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Workload {
    pub name: String,
    pub loads: Channels<Vec<TimedValue>>,
    pub value_generated: f64,
}

impl Workload {
    pub fn new(
        name: impl Into<String>,
        loads: Channels<Vec<TimedValue>>,
        value_generated: f64,
    ) -> Self {
        Self { name: name.into(), loads, value_generated }
    }

    /// Pad the shorter channels up to the longest one.
    ///
    /// Each appended slot holds the mean of the channel's original samples and has no timestamp.
    pub fn normalize(&mut self) {
        let length = self.loads.a.len().max(self.loads.b.len()).max(self.loads.c.len());
        for channel in [Channel::A, Channel::B, Channel::C] {
            pad_with_mean(self.loads.get_mut(channel), length);
        }
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Check that all the channels have equal length and return the length.
    pub fn ensure_synchronized(&self) -> Result<usize, StatisticsError> {
        let (a, b, c) = (self.loads.a.len(), self.loads.b.len(), self.loads.c.len());
        if a == b && a == c {
            Ok(a)
        } else {
            Err(StatisticsError::UnsynchronizedChannels { name: self.name.clone(), a, b, c })
        }
    }

    /// Total of the first sample at exactly the `timestamp` in every channel.
    #[must_use]
    pub fn load_at(&self, timestamp: chrono::DateTime<chrono::Utc>) -> f64 {
        self.loads
            .iter()
            .filter_map(|(_, series)| {
                series.iter().find(|sample| sample.timestamp == Some(timestamp))
            })
            .map(|sample| sample.value)
            .sum()
    }
}

/// Mean of the series values, `0.0` for an empty series.
#[must_use]
pub fn mean_value(series: &[TimedValue]) -> f64 {
    let mean: Mean = series.iter().map(|sample| sample.value).collect();
    if mean.is_empty() { 0.0 } else { mean.mean() }
}

fn pad_with_mean(series: &mut Vec<TimedValue>, length: usize) {
    if series.len() < length {
        let fill = TimedValue::unset(mean_value(series));
        series.resize(length, fill);
    }
}
