//! Command implementations for the APM CLI.
//!
//! Each subcommand reads an export from disk, runs one of the `apm-data`
//! transforms and writes the result as CSV or JSON for a chart layer.

use apm_core::reporting_period::{LOAD_DEMAND_WEEKS, PHYSICAL_WEEKS};
use apm_data::gradient::DEFAULT_MAX_SEGMENTS;
use apm_data::workload::{WorkloadWindows, DEFAULT_ACUTE_WINDOW, DEFAULT_CHRONIC_WINDOW};
use clap::builder::RangedU64ValueParser;
use clap::Subcommand;
use std::path::PathBuf;

pub mod load_demand;
pub mod output;
pub mod physical;
pub mod players;

pub use output::OutputFormat;

/// Upper bound accepted for `--max-segments`.
pub const MAX_SEGMENTS_LIMIT: u64 = 1000;

fn max_segments_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..=MAX_SEGMENTS_LIMIT)
}

#[derive(Subcommand)]
pub enum Command {
    /// Rolling acute:chronic workload ratio for one GPS metric
    Acwr {
        /// GPS export (CSV, optionally .gz)
        #[arg(short, long)]
        gps: PathBuf,

        #[arg(short, long, default_value = "distance")]
        metric: String,

        /// Acute window in rows
        #[arg(long, default_value_t = DEFAULT_ACUTE_WINDOW)]
        acute: usize,

        /// Chronic window in rows
        #[arg(long, default_value_t = DEFAULT_CHRONIC_WINDOW)]
        chronic: usize,

        /// Only write the last N weeks (0 writes every row)
        #[arg(short, long, default_value_t = LOAD_DEMAND_WEEKS)]
        weeks: i64,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Intensity gradient segments for GPS metrics
    Gradient {
        #[arg(short, long)]
        gps: PathBuf,

        /// Metric to bucketize; repeat for several (all chart metrics when omitted)
        #[arg(short, long)]
        metric: Vec<String>,

        /// Slices per bar at the column's extreme (1 to 1000)
        #[arg(long, default_value_t = DEFAULT_MAX_SEGMENTS, value_parser = max_segments_parser())]
        max_segments: usize,

        #[arg(short, long, default_value_t = LOAD_DEMAND_WEEKS)]
        weeks: i64,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Benchmark gradients or heatmap for physical capability tests
    Physical {
        /// Physical test export (CSV, optionally .gz)
        #[arg(short, long)]
        tests: PathBuf,

        /// `isometric` or `dynamic`
        #[arg(short, long, default_value = "isometric")]
        expression: String,

        /// Slices per bar at the column's extreme (1 to 1000)
        #[arg(long, default_value_t = DEFAULT_MAX_SEGMENTS, value_parser = max_segments_parser())]
        max_segments: usize,

        #[arg(short, long, default_value_t = PHYSICAL_WEEKS)]
        weeks: i64,

        /// Write mean benchmark per movement/quality instead of segments
        #[arg(long)]
        heatmap: bool,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Match/training averages, match days and heart-rate zone totals
    Summary {
        #[arg(short, long)]
        gps: PathBuf,

        #[arg(short, long, default_value = "distance")]
        metric: String,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// A player profile and its comparison candidates, as JSON
    Players {
        /// Squads document (players.json)
        #[arg(short, long)]
        players: PathBuf,

        #[arg(long)]
        id: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Acwr {
            gps,
            metric,
            acute,
            chronic,
            weeks,
            format,
            output,
        } => {
            let windows = WorkloadWindows::new(acute, chronic)?;
            load_demand::run_acwr(&gps, &metric, windows, weeks, format, output.as_deref())
        }
        Command::Gradient {
            gps,
            metric,
            max_segments,
            weeks,
            format,
            output,
        } => {
            let metrics = if metric.is_empty() {
                apm_core::gps::GRADIENT_METRICS.map(String::from).to_vec()
            } else {
                metric
            };
            load_demand::run_gradient(&gps, &metrics, max_segments, weeks, format, output.as_deref())
        }
        Command::Physical {
            tests,
            expression,
            max_segments,
            weeks,
            heatmap,
            format,
            output,
        } => physical::run_physical(
            &tests,
            &expression,
            max_segments,
            weeks,
            heatmap,
            format,
            output.as_deref(),
        ),
        Command::Summary {
            gps,
            metric,
            format,
            output,
        } => load_demand::run_summary(&gps, &metric, format, output.as_deref()),
        Command::Players {
            players,
            id,
            output,
        } => players::run_players(&players, &id, output.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[derive(Parser)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_acwr_defaults() {
        let cli = Cli::try_parse_from(["apm-cli", "acwr", "--gps", "gps.csv"]).unwrap();
        match cli.command {
            Command::Acwr {
                metric,
                acute,
                chronic,
                weeks,
                format,
                output,
                ..
            } => {
                assert_eq!(metric, "distance");
                assert_eq!((acute, chronic), (7, 28));
                assert_eq!(weeks, 6);
                assert_eq!(format, OutputFormat::Csv);
                assert!(output.is_none());
            }
            _ => panic!("expected acwr"),
        }
    }

    #[test]
    fn test_gradient_repeated_metrics_and_json() {
        let cli = Cli::try_parse_from([
            "apm-cli", "gradient", "-g", "gps.csv", "-m", "distance", "-m", "peak_speed", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::Gradient {
                metric,
                max_segments,
                format,
                ..
            } => {
                assert_eq!(metric, vec!["distance", "peak_speed"]);
                assert_eq!(max_segments, 30);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected gradient"),
        }
    }

    #[test]
    fn test_max_segments_range() {
        for bad in ["0", "1001", "18446744073709551615"] {
            let parsed = Cli::try_parse_from(["apm-cli", "gradient", "-g", "gps.csv", "--max-segments", bad]);
            assert!(parsed.is_err(), "{bad} accepted");
        }
        let cli = Cli::try_parse_from(["apm-cli", "physical", "-t", "tests.csv", "--max-segments", "1000"]).unwrap();
        match cli.command {
            Command::Physical { max_segments, .. } => assert_eq!(max_segments, 1000),
            _ => panic!("expected physical"),
        }
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let cli = Cli::try_parse_from(["apm-cli", "acwr", "--gps", "gps.csv", "--acute", "0"]).unwrap();
        let err = run(cli.command).unwrap_err();
        assert!(err.to_string().contains("Invalid workload windows"));
    }
}
