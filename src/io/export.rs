use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{
    core::Channels,
    fmt::format_timestamp,
    prelude::*,
    report::{Summary, WorkloadReport},
    statistics::{timeline::Timeline, volatility::IntervalChange},
};

pub const TIMELINE_FILE_NAME: &str = "output.csv";
pub const VOLATILITY_FILE_NAME: &str = "workload_volatility.csv";
pub const CHANGES_FILE_NAME: &str = "workload_volatility_intervals.csv";
pub const BLOCK_VOLATILITY_FILE_NAME: &str = "volatility_output.csv";
pub const WORKLOADS_FILE_NAME: &str = "workload_statistics.csv";
pub const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Creates the export files inside a single directory.
#[must_use]
pub struct Exporter {
    directory: PathBuf,
}

impl Exporter {
    pub fn try_new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .with_context(|| format!("failed to create `{}`", directory.display()))?;
        Ok(Self { directory })
    }

    /// Create the file, write it with `write`, and flush it.
    #[instrument(skip_all, fields(file_name))]
    pub fn export(
        &self,
        file_name: &str,
        write: impl FnOnce(&mut BufWriter<File>) -> Result,
    ) -> Result<PathBuf> {
        let path = self.directory.join(file_name);
        let mut writer = BufWriter::new(
            File::create(&path).with_context(|| format!("failed to create `{}`", path.display()))?,
        );
        write(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "exported");
        Ok(path)
    }

    #[instrument(skip_all)]
    pub fn write_summary(&self, summary: &Summary<'_>) -> Result<PathBuf> {
        let contents = toml::to_string(summary).context("failed to serialize the summary")?;
        self.export(SUMMARY_FILE_NAME, |writer| Ok(writer.write_all(contents.as_bytes())?))
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Aggregated timeline, headerless and at full precision.
pub fn write_timeline(writer: &mut impl Write, timeline: &Timeline) -> Result {
    for point in timeline.as_slice() {
        writeln!(
            writer,
            "{},{},{},{}",
            format_timestamp(point.timestamp),
            point.totals.a,
            point.totals.b,
            point.totals.c,
        )?;
    }
    Ok(())
}

/// Per-workload interval volatility, blank where it is undefined.
pub fn write_volatility<'a>(
    writer: &mut impl Write,
    scores: impl IntoIterator<Item = (&'a str, Option<f64>)>,
) -> Result {
    writeln!(writer, "Workload,Volatility")?;
    for (name, score) in scores {
        writeln!(writer, "{},{}", escape(name), format_optional(score))?;
    }
    Ok(())
}

/// Interval-to-interval changes, blank timestamp where the window end has none.
pub fn write_changes<'a>(
    writer: &mut impl Write,
    changes: impl IntoIterator<Item = (&'a str, &'a IntervalChange)>,
) -> Result {
    writeln!(writer, "Timestamp,Workload,Change")?;
    for (name, change) in changes {
        writeln!(
            writer,
            "{},{},{:.2}",
            change.timestamp.map(format_timestamp).unwrap_or_default(),
            escape(name),
            change.change,
        )?;
    }
    Ok(())
}

pub fn write_block_volatility(
    writer: &mut impl Write,
    blocks: &[(DateTime<Utc>, Channels<f64>)],
) -> Result {
    writeln!(writer, "Time,Volatility Load 1,Volatility Load 2,Volatility Load 3")?;
    for (timestamp, std_dev) in blocks {
        writeln!(
            writer,
            "{},{:.2},{:.2},{:.2}",
            format_timestamp(*timestamp),
            std_dev.a,
            std_dev.b,
            std_dev.c,
        )?;
    }
    Ok(())
}

/// Every derived field of every workload, one row each.
pub fn write_workloads(writer: &mut impl Write, reports: &[WorkloadReport]) -> Result {
    writeln!(
        writer,
        "Workload,Samples,Total Load 1,Total Load 2,Total Load 3,Cost,Value Generated,\
         Relative Load 1,Relative Load 2,Relative Load 3,Relative Cost,Relative Value Generated,\
         Windowed Volatility Load 1,Windowed Volatility Load 2,Windowed Volatility Load 3,\
         Range Volatility Load 1,Range Volatility Load 2,Range Volatility Load 3,\
         Interval Volatility"
    )?;
    for report in reports {
        let totals = &report.aggregate.totals;
        let relative = &report.aggregate.relative;
        let windowed = report.volatility.windowed.as_ref().ok();
        let range = report.volatility.range.as_ref().ok();
        writeln!(
            writer,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{},{},{},{},{},{},{}",
            escape(&report.workload.name),
            report.workload.loads.a.len(),
            totals.loads.a,
            totals.loads.b,
            totals.loads.c,
            totals.cost,
            report.workload.value_generated,
            relative.loads.a,
            relative.loads.b,
            relative.loads.c,
            relative.cost,
            relative.value_generated,
            format_optional(windowed.map(|std_dev| std_dev.a)),
            format_optional(windowed.map(|std_dev| std_dev.b)),
            format_optional(windowed.map(|std_dev| std_dev.c)),
            format_optional(range.map(|range| range.a)),
            format_optional(range.map(|range| range.b)),
            format_optional(range.map(|range| range.c)),
            format_optional(report.volatility.interval.as_ref().ok().copied()),
        )?;
    }
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.2}")).unwrap_or_default()
}

/// Quote the field if it would break the row.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::core::{TimedValue, Workload};

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap().to_utc()
            + TimeDelta::minutes(minute)
    }

    fn written(write: impl FnOnce(&mut Vec<u8>) -> Result) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_timeline() {
        let workloads = [Workload::new(
            "W1",
            Channels::new(
                vec![TimedValue::at(at(1), 0.125), TimedValue::at(at(0), 1.0)],
                vec![TimedValue::at(at(0), 2.5)],
                vec![],
            ),
            0.0,
        )];
        let csv = written(|writer| write_timeline(writer, &Timeline::reduce(&workloads)));
        assert_eq!(csv, "2024-03-01T00:00:00Z,1,2.5,0\n2024-03-01T00:01:00Z,0.125,0,0\n");
    }

    #[test]
    fn test_write_volatility() {
        let csv = written(|writer| {
            write_volatility(writer, [("api", Some(1.2345)), ("batch, nightly", None)])
        });
        assert_eq!(csv, "Workload,Volatility\napi,1.23\n\"batch, nightly\",\n");
    }

    #[test]
    fn test_write_changes() {
        let changes = [
            IntervalChange { timestamp: Some(at(9)), change: -2.5 },
            IntervalChange { timestamp: None, change: 1.0 },
        ];
        let csv = written(|writer| {
            write_changes(writer, changes.iter().map(|change| ("api", change)))
        });
        assert_eq!(
            csv,
            "Timestamp,Workload,Change\n2024-03-01T00:09:00Z,api,-2.50\n,api,1.00\n",
        );
    }

    #[test]
    fn test_write_block_volatility() {
        let blocks = [(at(5), Channels::new(0.5, 1.0 / 3.0, 0.0))];
        let csv = written(|writer| write_block_volatility(writer, &blocks));
        assert_eq!(
            csv,
            "Time,Volatility Load 1,Volatility Load 2,Volatility Load 3\n\
             2024-03-01T00:05:00Z,0.50,0.33,0.00\n",
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_exporter_writes_into_directory() {
        let directory = tempfile::tempdir().unwrap();
        let exporter = Exporter::try_new(directory.path().join("reports")).unwrap();
        let path = exporter
            .export(VOLATILITY_FILE_NAME, |writer| write_volatility(writer, [("api", Some(1.0))]))
            .unwrap();
        assert_eq!(path, directory.path().join("reports").join(VOLATILITY_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "Workload,Volatility\napi,1.00\n");
    }
}
