use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single channel sample.
///
/// Padding slots appended by the normalizer have no timestamp.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::Constructor)]
pub struct TimedValue {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    pub value: f64,
}

impl TimedValue {
    pub const fn at(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp: Some(timestamp), value }
    }

    pub const fn unset(value: f64) -> Self {
        Self { timestamp: None, value }
    }
}
