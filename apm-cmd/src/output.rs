//! Writing command results as CSV or JSON to a file or stdout.

use anyhow::Context;
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One header row, then one row per record
    #[default]
    Csv,
    /// A pretty-printed JSON document
    Json,
}

/// Open `path` for writing, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Write `records` as CSV rows.
pub fn write_csv<T, I>(writer: impl Write, records: I) -> anyhow::Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut count = 0;
    for record in records {
        wtr.serialize(record)?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

/// Write any serialisable value as JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(mut writer: impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `records` in the requested format to `path` (or stdout).
pub fn write_records<T: Serialize>(
    records: &[T],
    format: OutputFormat,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let writer = open_output(path)?;
    match format {
        OutputFormat::Csv => {
            write_csv(writer, records)?;
        }
        OutputFormat::Json => write_json(writer, records)?,
    }
    log_destination(records.len(), path);
    Ok(())
}

pub(crate) fn log_destination(count: usize, path: Option<&Path>) {
    match path {
        Some(path) => log::info!("Wrote {} records to {}", count, path.display()),
        None => log::info!("Wrote {} records to stdout", count),
    }
}
