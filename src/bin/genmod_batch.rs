use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use genmod::batch::BatchProcessor;
use genmod::config::Config;
use genmod::logging;

#[derive(Parser, Debug)]
#[command(name = "genmod-batch")]
#[command(about = "Resample every raster listed in a JSON config onto the model grid")]
struct Args {
    /// JSON file describing the grid and the rasters to process
    #[arg(short, long)]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    info!(
        rasters = config.rasters().len(),
        output_directory = %config.output_directory().display(),
        parallel = config.parallel(),
        "Starting raster preprocessing"
    );

    let report = BatchProcessor::new(config).process();
    info!("Batch finished\n{report}");

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} raster(s) could not be processed");
    }

    Ok(())
}
