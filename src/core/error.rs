use std::path::PathBuf;

use crate::core::channel::Channel;

/// Conditions under which a statistic is undefined for the given data.
///
/// A zero volatility is a valid result, so these are never collapsed into `0.0`.
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error("failed to parse `{}`", path.display())]
    MalformedInput {
        path: PathBuf,

        #[source]
        source: serde_json::Error,
    },

    #[error("channel {0} has no samples")]
    EmptySeries(Channel),

    #[error("{what} is undefined for a non-positive denominator ({denominator})")]
    UndefinedRatio { what: &'static str, denominator: f64 },

    #[error("workload `{name}` has unsynchronized channels ({a}, {b}, {c})")]
    UnsynchronizedChannels { name: String, a: usize, b: usize, c: usize },

    #[error("insufficient samples: got {got}, need {need}")]
    InsufficientSamples { got: usize, need: usize },

    #[error("no workloads to analyze")]
    NoData,
}
