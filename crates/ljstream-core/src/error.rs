use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading a datalogger folder.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The folder holds no file whose name contains the extension filter.
    #[error("No files matching \"{extension}\" found in {folder}")]
    NoMatchingFiles { folder: PathBuf, extension: String },

    /// The folder itself could not be listed.
    #[error("Failed to read folder {path}: {source}")]
    FolderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header date/time lines, or a derived timestamp, were not valid.
    #[error("Invalid header timestamp: {0}")]
    TimeParse(String),

    /// A data file was unreadable, too short, or inconsistent with the set.
    #[error("Failed to parse {path}: {reason}")]
    FileParse { path: PathBuf, reason: String },

    /// Custom naming needs one time column plus an even number of channels.
    #[error("Expected an odd number of columns (Time + 2N channels), found {columns}")]
    ColumnArity { columns: usize },

    /// A name list is shorter than the detected channel count.
    #[error("{kind} names: {required} required but only {available} available")]
    InsufficientNames {
        kind: &'static str,
        required: usize,
        available: usize,
    },

    /// The configured timezone is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Writing an exported table failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl LoaderError {
    /// Shorthand for a [`LoaderError::FileParse`] on `path`.
    pub fn file_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LoaderError::FileParse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the ljstream crates.
pub type Result<T> = std::result::Result<T, LoaderError>;
