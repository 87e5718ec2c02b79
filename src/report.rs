use std::num::NonZeroUsize;

use bon::Builder;
use chrono::TimeDelta;
use rayon::prelude::*;
use serde::Serialize;
use serde_with::{DurationSeconds, serde_as};

use crate::{
    core::{StatisticsError, Workload, WorkloadCollection},
    prelude::*,
    statistics::{
        aggregation::{Aggregation, Deviation, GrandTotals, WorkloadAggregate},
        peak::{Contribution, ContributionRanking, PeakUsage},
        tiers::{ScoredWorkload, TierScore, VolatilityTiers},
        timeline::Timeline,
        volatility::{IntervalChange, VolatilityFigures},
    },
};

pub const DEFAULT_VOLATILITY_WINDOW: TimeDelta = TimeDelta::minutes(5);

pub const DEFAULT_INTERVAL_SIZE: NonZeroUsize = NonZeroUsize::new(5).unwrap();

/// Runs every statistic over a workload collection.
#[must_use]
#[derive(Copy, Clone, Builder)]
pub struct Analyzer {
    /// Wall-clock window of the windowed standard deviation.
    #[builder(default = DEFAULT_VOLATILITY_WINDOW)]
    volatility_window: TimeDelta,

    /// Sample count of the interval windows.
    #[builder(default = DEFAULT_INTERVAL_SIZE)]
    interval_size: NonZeroUsize,

    #[builder(default)]
    tier_score: TierScore,
}

impl Analyzer {
    #[instrument(skip_all, fields(n_workloads = collection.len()))]
    pub fn analyze(&self, collection: WorkloadCollection) -> Result<Report, StatisticsError> {
        if collection.is_empty() {
            return Err(StatisticsError::NoData);
        }

        info!("normalizing…");
        let workloads: Vec<Workload> =
            collection.into_vec().into_par_iter().map(Workload::normalized).collect();

        info!("aggregating…");
        let Aggregation { workloads: aggregates, grand_totals, deviation } =
            Aggregation::try_from_workloads(&workloads)?;

        info!(window = ?self.volatility_window, interval_size = self.interval_size.get(), "estimating volatility…");
        let volatility: Vec<VolatilityFigures> = workloads
            .par_iter()
            .map(|workload| {
                VolatilityFigures::estimate(workload, self.volatility_window, self.interval_size)
            })
            .collect();

        info!("looking for the peak usage…");
        let timeline = Timeline::reduce(&workloads);
        if timeline.is_empty() {
            warn!("no timestamped samples, peak usage is undefined");
        }
        let peak = timeline.peak();
        let ranking = peak
            .map(|peak| ContributionRanking::rank(&workloads, &peak))
            .unwrap_or_default();
        if let Some(peak) = peak {
            info!(
                n_points = timeline.len(),
                timestamp = %peak.timestamp,
                total_usage = peak.total_usage,
                "found the peak",
            );
        }

        let tiers: VolatilityTiers = workloads
            .iter()
            .zip(&volatility)
            .filter_map(|(workload, figures)| {
                self.tier_score
                    .of(figures)
                    .map(|score| ScoredWorkload { name: workload.name.clone(), score })
            })
            .collect();

        let workloads: Vec<WorkloadReport> = workloads
            .into_iter()
            .zip(aggregates)
            .zip(volatility)
            .map(|((workload, aggregate), volatility)| WorkloadReport {
                workload,
                aggregate,
                volatility,
            })
            .collect();
        for report in &workloads {
            for (estimator, error) in report.volatility.failures() {
                warn!(workload = %report.workload.name, estimator, "{error:#}");
            }
        }

        Ok(Report {
            workloads,
            grand_totals,
            deviation,
            timeline,
            peak,
            ranking,
            tiers,
            analyzer: *self,
        })
    }
}

/// Derived fields of a single normalized workload.
#[must_use]
#[derive(Debug)]
pub struct WorkloadReport {
    pub workload: Workload,
    pub aggregate: WorkloadAggregate,
    pub volatility: VolatilityFigures,
}

#[must_use]
pub struct Report {
    /// In the collection order.
    pub workloads: Vec<WorkloadReport>,

    pub grand_totals: GrandTotals,
    pub deviation: Deviation,
    pub timeline: Timeline,

    /// `None` when no sample has a timestamp.
    pub peak: Option<PeakUsage>,

    pub ranking: ContributionRanking,
    pub tiers: VolatilityTiers,
    pub analyzer: Analyzer,
}

impl Report {
    /// Interval changes of every workload, in the collection order.
    pub fn changes(&self) -> impl Iterator<Item = (&str, &IntervalChange)> {
        self.workloads.iter().flat_map(|report| {
            report
                .volatility
                .changes
                .iter()
                .flatten()
                .map(move |change| (report.workload.name.as_str(), change))
        })
    }

    /// Interval volatility of every workload, `None` where the estimator failed.
    pub fn interval_volatility(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.workloads.iter().map(|report| {
            (report.workload.name.as_str(), report.volatility.interval.as_ref().ok().copied())
        })
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary {
            n_workloads: self.workloads.len(),
            volatility_window: self.analyzer.volatility_window,
            interval_size: self.analyzer.interval_size.get(),
            tier_score: self.analyzer.tier_score,
            grand_totals: &self.grand_totals,
            deviation: DeviationSummary {
                average_total_load: self.deviation.average_total_load,
                upward_std_dev: self.deviation.upward_std_dev(),
                downward_std_dev: self.deviation.downward_std_dev(),
            },
            peak: self.peak,
            principal_contributors: self.ranking.principal(),
            tiers: &self.tiers,
        }
    }
}

/// Collection-wide part of the report.
#[must_use]
#[serde_as]
#[derive(Serialize)]
pub struct Summary<'a> {
    pub n_workloads: usize,

    #[serde_as(as = "DurationSeconds<i64>")]
    #[serde(rename = "volatility_window_seconds")]
    pub volatility_window: TimeDelta,

    pub interval_size: usize,
    pub tier_score: TierScore,
    pub grand_totals: &'a GrandTotals,
    pub deviation: DeviationSummary,
    pub peak: Option<PeakUsage>,
    pub principal_contributors: &'a [Contribution],
    pub tiers: &'a VolatilityTiers,
}

#[must_use]
#[derive(Copy, Clone, Serialize)]
pub struct DeviationSummary {
    pub average_total_load: f64,
    pub upward_std_dev: f64,
    pub downward_std_dev: f64,
}
