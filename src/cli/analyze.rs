use std::path::PathBuf;

use clap::Parser;
use enumset::EnumSet;

use crate::{
    cli::{input::InputArgs, volatility::VolatilityArgs},
    io::export::{self, Exporter},
    prelude::*,
    report::Report,
    tables::{build_failures_table, build_workloads_table},
};

#[derive(Parser)]
pub struct AnalyzeArgs {
    #[clap(flatten)]
    input: InputArgs,

    /// Directory to write the exports into, created if missing.
    #[clap(long, env = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    #[clap(
        long = "reports",
        env = "REPORTS",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "timeline,volatility,changes,blocks,workloads,summary",
    )]
    reports: Vec<ReportKind>,

    #[clap(flatten)]
    volatility: VolatilityArgs,

    /// Do not print the tables.
    #[clap(long)]
    no_tables: bool,
}

impl AnalyzeArgs {
    #[must_use]
    pub fn reports(&self) -> EnumSet<ReportKind> {
        self.reports.iter().copied().collect()
    }

    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let collection = self.input.load()?;
        let report = self.volatility.analyzer()?.analyze(collection)?;
        if !self.no_tables {
            print_tables(&report);
        }

        let exporter = Exporter::try_new(&self.output_dir)?;
        for kind in self.reports() {
            match kind {
                ReportKind::Timeline => {
                    exporter.export(export::TIMELINE_FILE_NAME, |writer| {
                        export::write_timeline(writer, &report.timeline)
                    })?;
                }
                ReportKind::Volatility => {
                    exporter.export(export::VOLATILITY_FILE_NAME, |writer| {
                        export::write_volatility(writer, report.interval_volatility())
                    })?;
                }
                ReportKind::Changes => {
                    exporter.export(export::CHANGES_FILE_NAME, |writer| {
                        export::write_changes(writer, report.changes())
                    })?;
                }
                ReportKind::Blocks => {
                    let blocks =
                        report.timeline.block_volatility(self.volatility.interval_size.get());
                    exporter.export(export::BLOCK_VOLATILITY_FILE_NAME, |writer| {
                        export::write_block_volatility(writer, &blocks)
                    })?;
                }
                ReportKind::Workloads => {
                    exporter.export(export::WORKLOADS_FILE_NAME, |writer| {
                        export::write_workloads(writer, &report.workloads)
                    })?;
                }
                ReportKind::Summary => {
                    exporter.write_summary(&report.summary())?;
                }
            }
        }

        info!(output_dir = %exporter.directory().display(), "exported the reports");
        Ok(())
    }
}

fn print_tables(report: &Report) {
    println!("{}", build_workloads_table(&report.workloads));
    println!("{}", report.grand_totals.table());
    println!("{}", report.deviation.table());
    if let Some(peak) = &report.peak {
        println!("{}", report.ranking.table(peak));
    }
    println!("{}", report.tiers.table());
    if report.workloads.iter().any(|workload| workload.volatility.failures().next().is_some()) {
        println!("{}", build_failures_table(&report.workloads));
    }
}

#[derive(Debug, clap::ValueEnum, enumset::EnumSetType)]
pub enum ReportKind {
    /// Aggregated load per timestamp.
    Timeline,

    /// Volatility score per workload.
    Volatility,

    /// Interval-to-interval changes per workload.
    Changes,

    /// Standard deviation of consecutive timeline blocks.
    Blocks,

    /// Every derived figure per workload.
    Workloads,

    /// Collection-wide TOML summary.
    Summary,
}
