//! Raster preprocessing for the NAWQA general groundwater models.
//!
//! Source rasters (elevation, recharge, aquifer thickness, ...) in any GDAL
//! format and projection are warped onto the regular MODFLOW grid and dumped
//! as whitespace-delimited text arrays.

pub mod array_io;
pub mod batch;
pub mod cli;
pub mod config;
pub mod grid;
pub mod logging;
pub mod resample;
pub mod summary;
pub mod units;

pub use config::{Config, ConfigError, RasterJob};
pub use grid::{GeoTransform, GridSpec, ResultGrid};
pub use resample::{DataSourceError, GridResampler, ResampleOutcome, ResamplingMethod};
