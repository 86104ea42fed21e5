//! Writing a loaded [`Table`] back out as delimited text or JSON.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use ljstream_core::error::{LoaderError, Result};
use ljstream_core::models::Table;
use ljstream_core::time_utils::format_timestamp;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Tab-separated, header row first.
    #[default]
    Tsv,
    /// Comma-separated, header row first.
    Csv,
    /// The whole table as pretty-printed JSON.
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Tsv => "tsv",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(ExportFormat::Tsv),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Write `table` to `writer` in `format`.
///
/// Delimited output has one header row (`table.columns`) and one line per
/// row; `time.POSIX` is rendered as `%Y-%m-%d %H:%M:%S%.f`.
pub fn write_table<W: Write>(table: &Table, writer: W, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Tsv => write_delimited(table, writer, b'\t'),
        ExportFormat::Csv => write_delimited(table, writer, b','),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, table).map_err(|e| LoaderError::Export(e.to_string()))
        }
    }
}

/// Write `table` into a new file at `path`, replacing any existing file.
pub fn write_table_to_path(table: &Table, path: &Path, format: ExportFormat) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| LoaderError::Export(format!("{}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    write_table(table, &mut writer, format)?;
    writer
        .flush()
        .map_err(|e| LoaderError::Export(format!("{}: {e}", path.display())))?;
    debug!("Wrote {} rows to {} as {}", table.len(), path.display(), format);
    Ok(())
}

fn write_delimited<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let export_err = |e: csv::Error| LoaderError::Export(e.to_string());

    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(&table.columns).map_err(export_err)?;
    for row in &table.rows {
        let mut record: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        record.push(format_timestamp(row.timestamp));
        out.write_record(&record).map_err(export_err)?;
    }
    out.flush()
        .map_err(|e| LoaderError::Export(e.to_string()))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
