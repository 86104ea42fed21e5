use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use ljstream_core::options::{FileOrder, LoadOptions};
use ljstream_data::export::ExportFormat;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Merge a folder of LJStream data files into one time-ordered table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ljstream",
    about = "Merge a folder of LJStream data files into one time-ordered table",
    version
)]
pub struct Settings {
    /// Folder holding the exported data files
    pub folder: PathBuf,

    /// Substring a file name must contain to be loaded
    #[arg(long, default_value = ".dat")]
    pub extension: String,

    /// Keep the column names found in the files
    #[arg(long)]
    pub default_header: bool,

    /// Comma-separated raw-channel labels (default a..p)
    #[arg(long, value_delimiter = ',')]
    pub channel_names: Option<Vec<String>>,

    /// Comma-separated transform labels (default y0..y16)
    #[arg(long, value_delimiter = ',')]
    pub transform_names: Option<Vec<String>>,

    /// Order in which files are parsed
    #[arg(long, default_value = "lexical", value_parser = ["listing", "lexical", "natural"])]
    pub file_order: String,

    /// Timezone of the instrument clock ("auto" for the system zone)
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "tsv", value_parser = ["tsv", "csv", "json"])]
    pub format: String,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Apply the `--debug` override.
    pub fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Library options equivalent to these flags.
    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        let file_order: FileOrder = self.file_order.parse().map_err(|e: String| anyhow!(e))?;
        Ok(LoadOptions {
            extension: self.extension.clone(),
            use_default_header: self.default_header,
            channel_names: self.channel_names.clone(),
            transform_names: self.transform_names.clone(),
            file_order,
            timezone: self.timezone.clone(),
        })
    }

    /// Requested output encoding.
    pub fn export_format(&self) -> anyhow::Result<ExportFormat> {
        self.format.parse().map_err(|e: String| anyhow!(e))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
