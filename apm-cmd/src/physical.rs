//! Physical development command: benchmark gradients per test column and
//! the movement/quality heatmap.

use crate::load_demand::{visible_period, write_segments};
use crate::output::{write_records, OutputFormat};
use anyhow::Context;
use apm_core::physical::PhysicalTest;
use apm_core::reporting_period::ReportingPeriod;
use apm_data::bucketize_table;
use apm_data::summary::average_benchmark;
use log::info;
use std::collections::BTreeSet;
use std::path::Path;

/// Columns measured under `expression`, in name order.
fn expression_columns(tests: &[PhysicalTest], expression: &str) -> Vec<String> {
    tests
        .iter()
        .filter(|t| t.expression == expression)
        .map(PhysicalTest::metric_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Write either the gradient segments of every test column for
/// `expression`, or with `heatmap` the mean benchmark per movement/quality.
///
/// Both are restricted to the last `weeks` weeks up to the newest test.
pub fn run_physical(
    tests_path: &Path,
    expression: &str,
    max_segments: usize,
    weeks: i64,
    heatmap: bool,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let tests = PhysicalTest::load(tests_path)
        .with_context(|| format!("Failed to load physical tests {}", tests_path.display()))?;
    let expression = expression.to_lowercase();
    let latest = tests.last().map(|t| t.test_date);
    let period = visible_period(latest, weeks);

    if heatmap {
        let period = match (period, latest) {
            (Some(period), _) => period,
            (None, Some(end)) => ReportingPeriod::new(tests[0].test_date, end),
            (None, None) => {
                info!("physical: no tests in {}", tests_path.display());
                return write_records::<apm_data::summary::BenchmarkCell>(&[], format, output);
            }
        };
        let cells = average_benchmark(&tests, &expression, &period);
        info!("physical: {} heatmap cells for {}", cells.len(), expression);
        return write_records(&cells, format, output);
    }

    let columns = expression_columns(&tests, &expression);
    let table = PhysicalTest::to_metric_table(&tests);
    let segments = bucketize_table(&table, &columns, max_segments)?
        .into_iter()
        .filter(|s| period.map_or(true, |p| p.contains(&s.date)))
        .collect::<Vec<_>>();
    info!(
        "physical: {} segments across {} {} columns",
        segments.len(),
        columns.len(),
        expression
    );
    write_segments(&segments, format, output)
}
