use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::ColumnNameSet;

/// Default file-name filter.
pub const DEFAULT_EXTENSION: &str = ".dat";

/// Default timezone for epoch-second conversion.
pub const DEFAULT_TIMEZONE: &str = "UTC";

// ── FileOrder ─────────────────────────────────────────────────────────────────

/// Order in which matching files are parsed.
///
/// Row order in the result never depends on this; rows are always sorted by
/// time afterwards. It does decide which file supplies the header time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrder {
    /// Whatever order the filesystem lists entries in.
    Listing,
    /// Byte-wise by file name.
    #[default]
    Lexical,
    /// By file name with digit runs compared numerically, so `run_2.dat`
    /// precedes `run_10.dat`.
    Natural,
}

impl fmt::Display for FileOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileOrder::Listing => "listing",
            FileOrder::Lexical => "lexical",
            FileOrder::Natural => "natural",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FileOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "listing" => Ok(FileOrder::Listing),
            "lexical" => Ok(FileOrder::Lexical),
            "natural" => Ok(FileOrder::Natural),
            other => Err(format!("unknown file order: {other}")),
        }
    }
}

// ── LoadOptions ───────────────────────────────────────────────────────────────

/// Parameters of a folder load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Substring a file name must contain to be loaded. Default `".dat"`.
    pub extension: String,
    /// Keep the header names found in the files and skip renaming.
    /// Default `false`.
    pub use_default_header: bool,
    /// Raw-channel labels; `None` means `a`..`p`.
    pub channel_names: Option<Vec<String>>,
    /// Transform labels; `None` means `y0`..`y16`.
    pub transform_names: Option<Vec<String>>,
    /// Parse order of the matched files. Default [`FileOrder::Lexical`].
    pub file_order: FileOrder,
    /// IANA zone (or `"auto"`) the header time is read in when converting to
    /// epoch seconds. Default `"UTC"`.
    pub timezone: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            use_default_header: false,
            channel_names: None,
            transform_names: None,
            file_order: FileOrder::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl LoadOptions {
    /// Options with a different extension filter.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Options that keep native header names.
    pub fn with_default_header(mut self, use_default_header: bool) -> Self {
        self.use_default_header = use_default_header;
        self
    }

    /// Options with explicit channel labels.
    pub fn with_channel_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Options with explicit transform labels.
    pub fn with_transform_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Options with a different file order.
    pub fn with_file_order(mut self, order: FileOrder) -> Self {
        self.file_order = order;
        self
    }

    /// Options with a different timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Name lists to rename with, defaults filled in.
    pub fn column_names(&self) -> ColumnNameSet {
        ColumnNameSet::resolve(
            self.channel_names.as_deref(),
            self.transform_names.as_deref(),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
