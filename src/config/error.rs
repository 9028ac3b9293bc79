use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid geotransform literal `{literal}`: {reason}")]
    Geotransform { literal: String, reason: String },
    #[error("invalid grid dimensions: {ncol} columns and {nrow} rows")]
    Dimension { ncol: i64, nrow: i64 },
    #[error("unknown resampling method `{0}`")]
    ResamplingMethod(String),
    #[error("raster name `{0}` is used more than once")]
    DuplicateRaster(String),
    #[error("output file `{}` is written by more than one raster", .0.display())]
    DuplicateOutput(PathBuf),
    #[error("no rasters configured")]
    NoRasters,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
