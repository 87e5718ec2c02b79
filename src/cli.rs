mod analyze;
mod input;
mod inspect;
mod volatility;

use clap::{Parser, Subcommand};

use crate::{
    cli::{analyze::AnalyzeArgs, inspect::InspectArgs},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: analyze the workload files and export the reports.
    #[clap(name = "analyze")]
    Analyze(Box<AnalyzeArgs>),

    /// Print the per-workload statistics of the given files.
    #[clap(name = "inspect")]
    Inspect(Box<InspectArgs>),
}

impl Command {
    pub fn run(self) -> Result {
        match self {
            Self::Analyze(args) => args.run(),
            Self::Inspect(args) => args.run(),
        }
    }
}
