mod bootstrap;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use ljstream_data::export::{write_table, write_table_to_path};
use ljstream_data::loader::DataFolderLoader;
use settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::parse().resolve();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("ljstream v{} starting", env!("CARGO_PKG_VERSION"));

    let options = settings.load_options()?;
    let format = settings.export_format()?;
    tracing::debug!("Load options: {:?}", options);

    let table = DataFolderLoader::new(options)
        .load(&settings.folder)
        .with_context(|| format!("loading {}", settings.folder.display()))?;

    match &settings.output {
        Some(path) => {
            write_table_to_path(&table, path, format)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_table(&table, stdout.lock(), format).context("writing to stdout")?;
        }
    }

    Ok(())
}
