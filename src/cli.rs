use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::array_io;
use crate::config::ConfigError;
use crate::grid::{GeoTransform, GridSpec};
use crate::resample::{GridResampler, ResamplingMethod};
use crate::summary::GridSummary;

/// Project one raster onto the model grid and save it as a text array.
#[derive(Parser, Debug)]
#[command(name = "genmod")]
#[command(about = "Resample a raster onto a model grid and write it as a text array")]
#[command(allow_negative_numbers = true)]
pub struct Args {
    /// Raster data source (GeoTIFF, ESRI grid, IMG, ...)
    pub source_path: PathBuf,

    /// Text file receiving the grid, one row per line
    pub output_path: PathBuf,

    /// Value used for every cell when the source does not exist
    pub noflo_value: f64,

    /// Target geotransform, e.g. `[x0,dx,0,y0,0,-dy]`
    pub geotransform: String,

    /// Target spatial reference (WKT, PROJ string or EPSG:<code>)
    pub spatial_reference: String,

    /// Number of grid columns
    pub num_columns: i64,

    /// Number of grid rows
    pub num_rows: i64,

    /// Resampling method (near, bilinear, cubic, cubicspline, lanczos,
    /// average, mode, max, min, med, q1, q3)
    #[arg(long, default_value_t = ResamplingMethod::Min)]
    pub method: ResamplingMethod,

    /// Factor applied to every resampled value to change units
    #[arg(long, default_value_t = 1.0)]
    pub conversion: f64,

    /// Also apply the conversion factor to the no-data fill of a missing source
    #[arg(long)]
    pub scale_fallback: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validates the grid arguments. Runs before any file is touched.
    pub fn grid_spec(&self) -> Result<GridSpec, ConfigError> {
        let geotransform: GeoTransform = self.geotransform.parse()?;
        GridSpec::new(
            self.num_columns,
            self.num_rows,
            geotransform,
            self.spatial_reference.clone(),
            self.noflo_value,
        )
    }
}

/// Resamples `args.source_path` onto the grid and writes the text array.
///
/// Grid arguments are validated before the source is looked at. A missing
/// source still produces an output file holding the no-data fill.
pub fn run(args: &Args) -> Result<()> {
    let grid = args.grid_spec()?;
    let resampler = GridResampler::new().with_scale_fallback(args.scale_fallback);

    info!(
        source = %args.source_path.display(),
        method = %args.method,
        rows = grid.nrow(),
        cols = grid.ncol(),
        origin = ?grid.geotransform().origin(),
        cell_size = ?grid.geotransform().pixel_size(),
        "Processing raster onto model grid"
    );

    let outcome = resampler
        .resample(&args.source_path, &grid, args.method, args.conversion)
        .with_context(|| format!("failed to process {}", args.source_path.display()))?;

    array_io::write_grid(&args.output_path, &outcome.grid)
        .with_context(|| format!("failed to write {}", args.output_path.display()))?;
    info!(output = %args.output_path.display(), "Grid written");

    if !outcome.fallback {
        let summary = GridSummary::of(&outcome.grid, grid.nodata() * args.conversion);
        info!("Grid statistics\n{summary}");
    }

    Ok(())
}
