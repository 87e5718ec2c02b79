use std::fmt::{Display, Formatter};

use comfy_table::{Cell, Color, Table, modifiers, presets};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::statistics::volatility::VolatilityFigures;

/// Volatility figure used to rank the workloads into tiers.
#[derive(Copy, Clone, Debug, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TierScore {
    /// Mean of the channel windowed standard deviations.
    #[default]
    Windowed,

    /// Mean of the channel range volatilities.
    Range,

    /// Interval sample standard deviation of the merged series.
    Interval,
}

impl TierScore {
    /// Score of the workload, `None` when the underlying estimator failed.
    #[must_use]
    pub fn of(self, figures: &VolatilityFigures) -> Option<f64> {
        match self {
            Self::Windowed => figures.windowed.as_ref().ok().map(|channels| channels.mean()),
            Self::Range => figures.range.as_ref().ok().map(|channels| channels.mean()),
            Self::Interval => figures.interval.as_ref().ok().copied(),
        }
    }
}

impl Display for TierScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windowed => write!(f, "windowed"),
            Self::Range => write!(f, "range"),
            Self::Interval => write!(f, "interval"),
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredWorkload {
    pub name: String,
    pub score: f64,
}

/// Workloads split into thirds by a descending volatility score.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VolatilityTiers {
    pub high: Vec<ScoredWorkload>,
    pub medium: Vec<ScoredWorkload>,

    /// Also takes the remainder of the division by three.
    pub low: Vec<ScoredWorkload>,
}

impl FromIterator<ScoredWorkload> for VolatilityTiers {
    fn from_iter<T: IntoIterator<Item = ScoredWorkload>>(iter: T) -> Self {
        let mut scored = iter.into_iter().collect_vec();
        scored.sort_by_key(|workload| -OrderedFloat(workload.score));

        let n = scored.len();
        let low = scored.split_off(2 * n / 3);
        let medium = scored.split_off(n / 3);
        Self { high: scored, medium, low }
    }
}

impl VolatilityTiers {
    #[must_use]
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec![Cell::from("Tier"), Cell::from("Workload"), Cell::from("Score")]);
        for (tier, color, workloads) in [
            ("High", Color::Red, &self.high),
            ("Medium", Color::DarkYellow, &self.medium),
            ("Low", Color::Green, &self.low),
        ] {
            for workload in workloads {
                table.add_row(vec![
                    Cell::from(tier).fg(color),
                    Cell::from(&workload.name),
                    Cell::from(format!("{:.2}", workload.score)),
                ]);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(n: usize) -> impl Iterator<Item = ScoredWorkload> {
        (0..n).map(|i| ScoredWorkload { name: format!("W{i}"), score: i as f64 })
    }

    fn names(workloads: &[ScoredWorkload]) -> Vec<&str> {
        workloads.iter().map(|workload| workload.name.as_str()).collect()
    }

    #[test]
    fn test_even_split() {
        let tiers: VolatilityTiers = scored(6).collect();
        assert_eq!(names(&tiers.high), ["W5", "W4"]);
        assert_eq!(names(&tiers.medium), ["W3", "W2"]);
        assert_eq!(names(&tiers.low), ["W1", "W0"]);
    }

    #[test]
    fn test_remainder_lands_in_low() {
        let tiers: VolatilityTiers = scored(5).collect();
        assert_eq!(names(&tiers.high), ["W4"]);
        assert_eq!(names(&tiers.medium), ["W3", "W2"]);
        assert_eq!(names(&tiers.low), ["W1", "W0"]);

        let tiers: VolatilityTiers = scored(2).collect();
        assert!(tiers.high.is_empty());
        assert_eq!(names(&tiers.medium), ["W1"]);
        assert_eq!(names(&tiers.low), ["W0"]);
    }
}
