use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{LoaderError, Result};
use crate::time_utils;

/// Name of the relative time column after custom renaming.
pub const TIME_COLUMN: &str = "Time";

/// Name of the derived absolute timestamp column.
pub const TIMESTAMP_COLUMN: &str = "time.POSIX";

/// Default raw-channel labels, `a` through `p`.
pub const DEFAULT_CHANNEL_NAMES: [&str; 16] = [
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p",
];

/// Default transform labels, `y0` through `y16`.
pub const DEFAULT_TRANSFORM_NAMES: [&str; 17] = [
    "y0", "y1", "y2", "y3", "y4", "y5", "y6", "y7", "y8", "y9", "y10", "y11", "y12", "y13",
    "y14", "y15", "y16",
];

// ── BaseTime ──────────────────────────────────────────────────────────────────

/// Absolute recording start read from the first two lines of the first file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTime(pub NaiveDateTime);

impl BaseTime {
    /// Parse the date line and the time line of a file header.
    pub fn parse(date_part: &str, time_part: &str) -> Result<Self> {
        time_utils::parse_header_time(date_part, time_part).map(BaseTime)
    }

    /// Wall-clock start time as written by the instrument.
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// `self` shifted by a relative offset in seconds.
    pub fn offset_by(&self, seconds: f64) -> Result<NaiveDateTime> {
        time_utils::add_offset(self.0, seconds)
    }

    /// Seconds since the Unix epoch, reading the header time in `tz`.
    pub fn epoch_seconds(&self, tz: Tz) -> Option<f64> {
        time_utils::to_epoch_seconds(self.0, tz)
    }
}

// ── ColumnNameSet ─────────────────────────────────────────────────────────────

/// Raw-channel and transform labels used for positional renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNameSet {
    pub channels: Vec<String>,
    pub transforms: Vec<String>,
}

impl Default for ColumnNameSet {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNEL_NAMES.iter().map(|s| s.to_string()).collect(),
            transforms: DEFAULT_TRANSFORM_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ColumnNameSet {
    /// Use the supplied lists where present, the defaults otherwise.
    pub fn resolve(channels: Option<&[String]>, transforms: Option<&[String]>) -> Self {
        let defaults = Self::default();
        Self {
            channels: channels.map(<[String]>::to_vec).unwrap_or(defaults.channels),
            transforms: transforms
                .map(<[String]>::to_vec)
                .unwrap_or(defaults.transforms),
        }
    }

    /// Full header for a table of `1 + 2 * n` data columns:
    /// `["Time"] + channels[..n] + transforms[..n]`.
    ///
    /// Names are assigned by position only; the k-th returned name labels the
    /// k-th column of the file regardless of what the file called it.
    pub fn header_for(&self, n: usize) -> Result<Vec<String>> {
        if n > self.channels.len() {
            return Err(LoaderError::InsufficientNames {
                kind: "channel",
                required: n,
                available: self.channels.len(),
            });
        }
        if n > self.transforms.len() {
            return Err(LoaderError::InsufficientNames {
                kind: "transform",
                required: n,
                available: self.transforms.len(),
            });
        }

        let mut names = Vec::with_capacity(1 + 2 * n);
        names.push(TIME_COLUMN.to_string());
        names.extend(self.channels[..n].iter().cloned());
        names.extend(self.transforms[..n].iter().cloned());
        Ok(names)
    }
}

/// Channel count N for a file with `columns` data columns (`1 + 2N`).
pub fn channel_count(columns: usize) -> Result<usize> {
    if columns == 0 || columns % 2 == 0 {
        return Err(LoaderError::ColumnArity { columns });
    }
    Ok((columns - 1) / 2)
}

// ── Row / Table ───────────────────────────────────────────────────────────────

/// One measurement sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Every data column of the file in file order, the time offset included.
    pub values: Vec<f64>,
    /// Base time plus the row's relative offset (`time.POSIX`).
    pub timestamp: NaiveDateTime,
}

/// The concatenated, time-sorted contents of a data folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Data column names followed by [`TIMESTAMP_COLUMN`].
    pub columns: Vec<String>,
    /// Rows, non-decreasing in the time column.
    pub rows: Vec<Row>,
    /// Zero reference for the relative offsets.
    pub base_time: BaseTime,
    /// Index of the relative time column within [`Row::values`].
    pub time_index: usize,
    /// Files that contributed rows, in parse order.
    pub source_files: Vec<PathBuf>,
    /// Zone the header time is read in when converting to epoch seconds.
    #[serde(with = "tz_name")]
    pub timezone: Tz,
}

impl Table {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of the numeric data columns (everything but `time.POSIX`).
    pub fn data_columns(&self) -> &[String] {
        let n = self.columns.len().saturating_sub(1);
        &self.columns[..n]
    }

    /// Number of raw channels N, when the layout is `Time + 2N`.
    pub fn channel_count(&self) -> Option<usize> {
        channel_count(self.data_columns().len()).ok()
    }

    /// Position of a data column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.data_columns().iter().position(|c| c == name)
    }

    /// Values of a numeric column by name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Relative time offsets, in row order.
    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.values[self.time_index]).collect()
    }

    /// Derived absolute timestamps, in row order.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    /// Seconds since the Unix epoch for every row, reading timestamps in
    /// [`Table::timezone`]. Local times that do not exist in that zone map
    /// to `None`.
    pub fn epoch_seconds(&self) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|r| time_utils::to_epoch_seconds(r.timestamp, self.timezone))
            .collect()
    }
}

mod tz_name {
    use chrono_tz::Tz;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tz: &Tz, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Tz, D::Error> {
        let name = String::deserialize(d)?;
        name.parse::<Tz>().map_err(serde::de::Error::custom)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
