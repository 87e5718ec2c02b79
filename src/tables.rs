use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{fmt::FormattedPercentage, report::WorkloadReport};

pub fn build_workloads_table(reports: &[WorkloadReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec![
        "Workload", "Samples", "Load 1", "Load 2", "Load 3", "Cost", "Cost\nshare", "Value",
        "Value\nshare", "Windowed\nstd. dev.", "Range\nvolatility", "Interval\nstd. dev.",
    ]);
    for report in reports {
        let totals = &report.aggregate.totals;
        let relative = &report.aggregate.relative;
        let mut row = vec![
            Cell::new(&report.workload.name).add_attribute(Attribute::Bold),
            Cell::new(report.workload.loads.a.len())
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
        ];
        row.extend(totals.loads.zip(relative.loads).iter().map(|(_, (total, share))| {
            Cell::new(format!("{total:.2}\n{}", FormattedPercentage(*share)))
                .set_alignment(CellAlignment::Right)
        }));
        row.extend([
            Cell::new(format!("{:.2}", totals.cost)).set_alignment(CellAlignment::Right),
            Cell::new(FormattedPercentage(relative.cost)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", report.workload.value_generated))
                .set_alignment(CellAlignment::Right),
            Cell::new(FormattedPercentage(relative.value_generated))
                .set_alignment(CellAlignment::Right),
        ]);
        row.push(match &report.volatility.windowed {
            Ok(std_dev) => {
                Cell::new(format!("{:.2}\n{:.2}\n{:.2}", std_dev.a, std_dev.b, std_dev.c))
                    .set_alignment(CellAlignment::Right)
            }
            Err(_) => undefined_cell(),
        });
        row.push(match &report.volatility.range {
            Ok(range) => Cell::new(format!("{:.0}%\n{:.0}%\n{:.0}%", range.a, range.b, range.c))
                .set_alignment(CellAlignment::Right),
            Err(_) => undefined_cell(),
        });
        row.push(match &report.volatility.interval {
            Ok(std_dev) => Cell::new(format!("{std_dev:.2}")).set_alignment(CellAlignment::Right),
            Err(_) => undefined_cell(),
        });
        table.add_row(row);
    }
    table
}

/// Estimators that could not produce a figure, with the reasons.
pub fn build_failures_table(reports: &[WorkloadReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["Workload", "Estimator", "Reason"]);
    for report in reports {
        for (estimator, error) in report.volatility.failures() {
            table.add_row(vec![
                Cell::new(&report.workload.name),
                Cell::new(estimator).add_attribute(Attribute::Dim),
                Cell::new(error).fg(Color::DarkYellow),
            ]);
        }
    }
    table
}

fn undefined_cell() -> Cell {
    Cell::new("n/a").set_alignment(CellAlignment::Center).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Channels, Workload, WorkloadCollection},
        report::Analyzer,
    };

    #[test]
    fn test_build_tables() {
        let collection: WorkloadCollection = [Workload::new(
            "api",
            Channels::new(vec![], vec![], vec![]),
            1.0,
        )]
        .into_iter()
        .collect();
        let report = Analyzer::builder().build().analyze(collection).unwrap();

        let workloads = build_workloads_table(&report.workloads).to_string();
        assert!(workloads.contains("api"));
        assert!(workloads.contains("n/a"));

        let failures = build_failures_table(&report.workloads);
        assert_eq!(failures.row_count(), 3);
    }
}
