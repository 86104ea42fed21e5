//! Data ingestion layer for LJStream datalogger folders.
//!
//! Responsible for discovering and parsing the tab-delimited export files of
//! one acquisition session, running the folder load pipeline and exporting
//! the resulting table.

pub mod export;
pub mod loader;
pub mod reader;

pub use ljstream_core as core;
pub use loader::{load, DataFolderLoader};
