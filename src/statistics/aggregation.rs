use comfy_table::{Cell, CellAlignment, Table, modifiers, presets};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    core::{Channels, StatisticsError, Workload},
    prelude::*,
};

/// Sums of a single workload.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct WorkloadTotals {
    pub loads: Channels<f64>,

    /// Sum of all the channel totals.
    pub cost: f64,
}

impl From<&Workload> for WorkloadTotals {
    fn from(workload: &Workload) -> Self {
        let loads = workload
            .loads
            .as_ref()
            .map(|series| series.iter().map(|sample| sample.value).sum::<f64>());
        Self { loads, cost: loads.total() }
    }
}

/// Workload shares of the collection totals, in percent.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RelativeContribution {
    pub loads: Channels<f64>,
    pub cost: f64,
    pub value_generated: f64,
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct GrandTotals {
    pub loads: Channels<f64>,
    pub cost: f64,
    pub value_generated: f64,
    pub n_workloads: usize,
}

impl GrandTotals {
    pub fn relative(&self, totals: &WorkloadTotals, value_generated: f64) -> RelativeContribution {
        RelativeContribution {
            loads: totals.loads.zip(self.loads).map(|(part, whole)| percentage(part, whole)),
            cost: percentage(totals.cost, self.cost),
            value_generated: percentage(value_generated, self.value_generated),
        }
    }

    /// Average total load per workload.
    #[expect(clippy::cast_precision_loss)]
    pub fn average_total_load(&self) -> Result<f64, StatisticsError> {
        if self.n_workloads == 0 {
            return Err(StatisticsError::NoData);
        }
        Ok(self.cost / self.n_workloads as f64)
    }

    /// Split the squared deviations from the average total load into upward and downward sums.
    pub fn deviation<'a>(
        &self,
        totals: impl IntoIterator<Item = &'a WorkloadTotals>,
    ) -> Result<Deviation, StatisticsError> {
        let average_total_load = self.average_total_load()?;
        let mut deviation = Deviation {
            average_total_load,
            upward_sum: 0.0,
            downward_sum: 0.0,
            n_workloads: self.n_workloads,
        };
        for totals in totals {
            let delta = totals.cost - average_total_load;
            if delta > 0.0 {
                deviation.upward_sum += delta * delta;
            } else {
                deviation.downward_sum += delta * delta;
            }
        }
        Ok(deviation)
    }
}

/// Accumulates the grand totals workload by workload.
#[must_use]
#[derive(Copy, Clone, Default)]
pub struct Aggregator(GrandTotals);

impl Aggregator {
    pub fn add(&mut self, totals: &WorkloadTotals, value_generated: f64) {
        self.0.loads += totals.loads;
        self.0.cost += totals.cost;
        self.0.value_generated += value_generated;
        self.0.n_workloads += 1;
    }

    pub const fn finish(self) -> GrandTotals {
        self.0
    }
}

/// Asymmetric dispersion of the workload total loads around their average.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Deviation {
    pub average_total_load: f64,
    pub upward_sum: f64,
    pub downward_sum: f64,
    pub n_workloads: usize,
}

impl Deviation {
    #[must_use]
    pub fn upward_std_dev(&self) -> f64 {
        self.std_dev(self.upward_sum)
    }

    #[must_use]
    pub fn downward_std_dev(&self) -> f64 {
        self.std_dev(self.downward_sum)
    }

    #[expect(clippy::cast_precision_loss)]
    fn std_dev(&self, sum: f64) -> f64 {
        (sum / self.n_workloads as f64).sqrt()
    }

    #[must_use]
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec![
                Cell::from("Workloads"),
                Cell::from("Average\ntotal load"),
                Cell::from("Upward\nstd. dev."),
                Cell::from("Downward\nstd. dev."),
            ])
            .add_row(vec![
                Cell::from(self.n_workloads),
                Cell::from(format!("{:.2}", self.average_total_load))
                    .set_alignment(CellAlignment::Right),
                Cell::from(format!("{:.2}", self.upward_std_dev()))
                    .set_alignment(CellAlignment::Right),
                Cell::from(format!("{:.2}", self.downward_std_dev()))
                    .set_alignment(CellAlignment::Right),
            ]);
        table
    }
}

/// Totals and relative figures of a single workload.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct WorkloadAggregate {
    pub totals: WorkloadTotals,
    pub relative: RelativeContribution,
}

#[must_use]
pub struct Aggregation {
    /// In the collection order.
    pub workloads: Vec<WorkloadAggregate>,

    pub grand_totals: GrandTotals,
    pub deviation: Deviation,
}

impl Aggregation {
    /// Aggregate the already normalized workloads.
    #[instrument(skip_all, fields(n_workloads = workloads.len()))]
    pub fn try_from_workloads(workloads: &[Workload]) -> Result<Self, StatisticsError> {
        if workloads.is_empty() {
            return Err(StatisticsError::NoData);
        }
        let totals: Vec<WorkloadTotals> = workloads.par_iter().map(WorkloadTotals::from).collect();

        let mut aggregator = Aggregator::default();
        for (workload, totals) in workloads.iter().zip(&totals) {
            aggregator.add(totals, workload.value_generated);
        }
        let grand_totals = aggregator.finish();
        let deviation = grand_totals.deviation(&totals)?;
        debug!(
            grand_total_cost = grand_totals.cost,
            average_total_load = deviation.average_total_load,
            "aggregated",
        );

        let workloads = workloads
            .iter()
            .zip(totals)
            .map(|(workload, totals)| WorkloadAggregate {
                totals,
                relative: grand_totals.relative(&totals, workload.value_generated),
            })
            .collect();
        Ok(Self { workloads, grand_totals, deviation })
    }
}

impl GrandTotals {
    #[must_use]
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .enforce_styling()
            .set_header(vec![
                Cell::from("Load 1"),
                Cell::from("Load 2"),
                Cell::from("Load 3"),
                Cell::from("Cost"),
                Cell::from("Value\ngenerated"),
            ]);
        table.add_row(
            [self.loads.a, self.loads.b, self.loads.c, self.cost, self.value_generated]
                .into_iter()
                .map(|value| Cell::from(format!("{value:.2}")).set_alignment(CellAlignment::Right)),
        );
        table
    }
}

/// `part` as percent of `whole`, zero for a non-positive `whole`.
fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { 100.0 * part / whole } else { 0.0 }
}
