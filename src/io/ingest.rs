use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    core::{Channels, StatisticsError, TimedValue, Workload, WorkloadCollection},
    prelude::*,
};

pub const FILE_EXTENSION: &str = "json";

/// Top-level structure of a workload file.
#[derive(Deserialize)]
struct WorkloadFile {
    #[serde(default)]
    workloads: Vec<WorkloadRecord>,
}

#[derive(Deserialize)]
struct WorkloadRecord {
    name: String,

    #[serde(default)]
    load1: Vec<TimedValue>,

    #[serde(default)]
    load2: Vec<TimedValue>,

    #[serde(default)]
    load3: Vec<TimedValue>,

    #[serde(default, rename = "valueGenerated")]
    value_generated: f64,
}

impl From<WorkloadRecord> for Workload {
    fn from(record: WorkloadRecord) -> Self {
        Self::new(
            record.name,
            Channels::new(record.load1, record.load2, record.load3),
            record.value_generated,
        )
    }
}

/// Find the workload files directly inside the directory, sorted by the path.
#[instrument(skip_all, fields(directory = %directory.display(), prefix))]
pub fn discover(directory: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)
        .with_context(|| format!("failed to list `{}`", directory.display()))?
    {
        let path = entry?.path();
        if path.is_file()
            && path.extension().is_some_and(|extension| extension == FILE_EXTENSION)
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix))
        {
            paths.push(path);
        }
    }
    paths.sort();
    info!(n_files = paths.len(), "discovered");
    Ok(paths)
}

/// Parse all the workload records of a single file.
pub fn read_workloads(path: &Path) -> Result<Vec<Workload>> {
    let contents =
        fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let file: WorkloadFile = serde_json::from_slice(&contents)
        .map_err(|source| StatisticsError::MalformedInput { path: path.to_path_buf(), source })?;
    Ok(file.workloads.into_iter().map(Workload::from).collect())
}

/// Load the files into a single collection, skipping the unreadable ones.
#[instrument(skip_all, fields(n_files = paths.len()))]
pub fn load_collection(paths: &[PathBuf]) -> WorkloadCollection {
    let mut collection = WorkloadCollection::default();
    for path in paths {
        match read_workloads(path) {
            Ok(workloads) => {
                debug!(path = %path.display(), n_workloads = workloads.len(), "loaded");
                collection.extend(workloads);
            }
            Err(error) => {
                warn!(path = %path.display(), "skipping: {error:#}");
            }
        }
    }
    info!(n_workloads = collection.len(), "loaded the collection");
    collection
}
