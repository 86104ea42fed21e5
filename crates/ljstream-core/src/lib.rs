//! Core types for the LJStream folder loader.
//!
//! Holds the error taxonomy, the table data model, load options and the
//! header-time utilities shared by the data and CLI crates.

pub mod error;
pub mod models;
pub mod options;
pub mod time_utils;

pub use error::{LoaderError, Result};
pub use models::{BaseTime, ColumnNameSet, Row, Table};
pub use options::{FileOrder, LoadOptions};
