//! Export utilities for study results.
//!
//! | Format | Use Case |
//! |--------|----------|
//! | CSV | `Day,Beat,Meet,Miss` tables for plotting tools |
//! | JSON | Structured output for downstream pipelines |

use crate::error::Result;
use crate::types::{CaarTable, DayValue};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header row of exported CAAR tables.
pub const CAAR_HEADER: [&str; 4] = ["Day", "Beat", "Meet", "Miss"];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write a CAAR table as CSV to any writer. Missing cells are left empty.
pub fn write_caar_csv<W: Write>(table: &CaarTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CAAR_HEADER)?;

    for row in table.rows() {
        csv_writer.write_record([
            row.day.to_string(),
            cell(row.beat),
            cell(row.meet),
            cell(row.miss),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export a CAAR table to a CSV file.
pub fn export_caar_csv(table: &CaarTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_caar_csv(table, BufWriter::new(file))?;
    info!("Exported {} CAAR rows to {}", table.len(), path.display());
    Ok(())
}

/// Export a single `(day, value)` series to CSV under the given value header.
pub fn export_series_csv(series: &[DayValue], value_header: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Day", value_header])?;
    for point in series {
        writer.write_record([point.day.to_string(), point.value.to_string()])?;
    }
    writer.flush()?;
    info!("Exported {} rows to {}", series.len(), path.display());
    Ok(())
}

/// Export any serializable result as pretty JSON.
pub fn export_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    info!("Exported JSON to {}", path.display());
    Ok(())
}
