//! Folder-level load pipeline.
//!
//! Scans a folder, reads the recording start from the first file, parses and
//! concatenates every file, sorts by time, relabels columns and derives the
//! absolute `time.POSIX` timestamp for each row.

use std::path::{Path, PathBuf};

use ljstream_core::error::{LoaderError, Result};
use ljstream_core::models::{channel_count, Row, Table, TIMESTAMP_COLUMN, TIME_COLUMN};
use ljstream_core::options::LoadOptions;
use ljstream_core::time_utils::resolve_timezone;
use tracing::{debug, info};

use crate::reader::{self, DataFile};

// ── DataFolderLoader ──────────────────────────────────────────────────────────

/// Loads every matching export file of a folder into one [`Table`].
///
/// # Example
/// ```no_run
/// use ljstream_core::options::LoadOptions;
/// use ljstream_data::loader::DataFolderLoader;
///
/// let loader = DataFolderLoader::new(LoadOptions::default().with_channel_names(["temp", "flow"]));
/// let table = loader.load("data/run1").unwrap();
/// println!("{} rows", table.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataFolderLoader {
    options: LoadOptions,
}

impl DataFolderLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load `folder`. Either the whole folder loads or an error is returned;
    /// a failure in any single file aborts the load.
    pub fn load(&self, folder: impl AsRef<Path>) -> Result<Table> {
        load(folder.as_ref(), &self.options)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every file in `folder` whose name contains `options.extension`.
///
/// Columns are renamed by position, not by name: unless
/// `options.use_default_header` is set, the file's columns become
/// `["Time", channels[..N], transforms[..N]]` in file order, where
/// N = (column count - 1) / 2. `time.POSIX` is appended last.
pub fn load(folder: &Path, options: &LoadOptions) -> Result<Table> {
    let timezone = resolve_timezone(&options.timezone)?;

    let files = reader::find_data_files(folder, &options.extension, options.file_order)?;
    let Some(first) = files.first() else {
        return Err(LoaderError::NoMatchingFiles {
            folder: folder.to_path_buf(),
            extension: options.extension.clone(),
        });
    };

    let first_text = reader::read_file(first)?;
    let base_time = reader::base_time_from_text(first, &first_text)?;
    debug!("Base time {} from {}", base_time.naive(), first.display());

    let first_file = reader::parse_data_text(first, &first_text)?;
    drop(first_text);

    let header = first_file.header.clone();
    let mut values: Vec<Vec<f64>> = Vec::new();
    append_file(&mut values, &header, first_file)?;
    for path in &files[1..] {
        let file = reader::parse_data_file(path)?;
        append_file(&mut values, &header, file)?;
    }

    let mut columns = if options.use_default_header {
        header
    } else {
        let n = channel_count(header.len())?;
        options.column_names().header_for(n)?
    };
    let time_index = time_column_index(&columns);

    // `sort_by` is stable, so equal offsets keep file order.
    values.sort_by(|a, b| a[time_index].total_cmp(&b[time_index]));

    let rows = values
        .into_iter()
        .map(|values| {
            let timestamp = base_time.offset_by(values[time_index])?;
            Ok(Row { values, timestamp })
        })
        .collect::<Result<Vec<Row>>>()?;

    columns.push(TIMESTAMP_COLUMN.to_string());

    info!(
        "Loaded {} rows ({} columns) from {} files in {}",
        rows.len(),
        columns.len(),
        files.len(),
        folder.display()
    );

    Ok(Table {
        columns,
        rows,
        base_time,
        time_index,
        source_files: files,
        timezone,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Append `file`'s rows after checking its header against the first file's.
fn append_file(values: &mut Vec<Vec<f64>>, header: &[String], file: DataFile) -> Result<()> {
    if file.header.len() != header.len() {
        return Err(LoaderError::file_parse(
            file.path,
            format!(
                "{} columns, expected {} as in the first file",
                file.header.len(),
                header.len()
            ),
        ));
    }
    if file.header != header {
        return Err(LoaderError::file_parse(
            file.path,
            format!(
                "header [{}] differs from the first file's [{}]",
                file.header.join(", "),
                header.join(", ")
            ),
        ));
    }

    debug!("Appending {} rows from {}", file.rows.len(), file.path.display());
    values.extend(file.rows);
    Ok(())
}

/// The column named `Time`, or the first column when none is.
fn time_column_index(columns: &[String]) -> usize {
    columns.iter().position(|c| c == TIME_COLUMN).unwrap_or(0)
}

/// Paths `load` would read for `options`, in parse order.
pub fn matching_files(folder: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>> {
    reader::find_data_files(folder, &options.extension, options.file_order)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
