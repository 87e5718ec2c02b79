use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::volatility::VolatilityArgs,
    io::ingest,
    prelude::*,
    tables::{build_failures_table, build_workloads_table},
};

#[derive(Parser)]
pub struct InspectArgs {
    /// Workload files to load.
    #[clap(required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    #[clap(flatten)]
    volatility: VolatilityArgs,
}

impl InspectArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let collection = ingest::load_collection(&self.files);
        let report = self.volatility.analyzer()?.analyze(collection)?;
        println!("{}", build_workloads_table(&report.workloads));
        if report.workloads.iter().any(|workload| workload.volatility.failures().next().is_some()) {
            println!("{}", build_failures_table(&report.workloads));
        }
        Ok(())
    }
}
