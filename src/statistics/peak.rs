use chrono::{DateTime, Utc};
use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    core::Workload,
    fmt::format_timestamp,
    statistics::timeline::{AggregatedTimePoint, Timeline},
};

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PeakUsage {
    pub timestamp: DateTime<Utc>,
    pub total_usage: f64,
}

impl From<&AggregatedTimePoint> for PeakUsage {
    fn from(point: &AggregatedTimePoint) -> Self {
        Self { timestamp: point.timestamp, total_usage: point.total() }
    }
}

impl Timeline {
    /// Point with the highest combined load, the earliest one on ties.
    pub fn peak(&self) -> Option<PeakUsage> {
        self.as_slice()
            .iter()
            .reduce(|peak, point| if point.total() > peak.total() { point } else { peak })
            .map(PeakUsage::from)
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contribution {
    pub name: String,
    pub load_at_peak: f64,
}

/// Workload loads at the peak instant, highest first.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionRanking(Vec<Contribution>);

impl ContributionRanking {
    /// Rank the workloads by their load at exactly the peak timestamp.
    ///
    /// Workloads without a sample at that instant contribute zero. Equal loads keep the collection
    /// order.
    pub fn rank(workloads: &[Workload], peak: &PeakUsage) -> Self {
        let mut contributions: Vec<Contribution> = workloads
            .par_iter()
            .map(|workload| Contribution {
                name: workload.name.clone(),
                load_at_peak: workload.load_at(peak.timestamp),
            })
            .collect();
        contributions.sort_by_key(|contribution| -OrderedFloat(contribution.load_at_peak));
        Self(contributions)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Contribution] {
        &self.0
    }

    /// Top 10 % of the ranking by count, rounded down.
    #[must_use]
    pub fn principal(&self) -> &[Contribution] {
        &self.0[..self.0.len() / 10]
    }

    #[must_use]
    pub fn table(&self, peak: &PeakUsage) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec![
                Cell::from("Workload"),
                Cell::from("Load at peak").set_alignment(CellAlignment::Right),
            ]);
        table.add_row(vec![
            Cell::from(format_timestamp(peak.timestamp)).add_attribute(Attribute::Bold),
            Cell::from(format!("{:.2}", peak.total_usage))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
        ]);
        for contribution in self.principal() {
            table.add_row(vec![
                Cell::from(&contribution.name),
                Cell::from(format!("{:.2}", contribution.load_at_peak))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }
}
