use std::path::PathBuf;

use clap::Parser;

use crate::{core::WorkloadCollection, io::ingest, prelude::*};

#[derive(Parser)]
pub struct InputArgs {
    /// Directory to look up the workload files in.
    #[clap(long, env = "INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// File name prefix of the workload files.
    #[clap(long, env = "FILE_PREFIX", default_value = "Workload")]
    file_prefix: String,
}

impl InputArgs {
    pub fn load(&self) -> Result<WorkloadCollection> {
        let paths = ingest::discover(&self.input_dir, &self.file_prefix)?;
        ensure!(
            !paths.is_empty(),
            "no `{}*.{}` files found in `{}`",
            self.file_prefix,
            ingest::FILE_EXTENSION,
            self.input_dir.display(),
        );
        Ok(ingest::load_collection(&paths))
    }
}
