use std::path::PathBuf;
use thiserror::Error;

/// The source raster exists but could not be turned into a grid.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("could not open raster {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },
    #[error("invalid spatial reference `{definition}`: {source}")]
    SpatialReference {
        definition: String,
        #[source]
        source: gdal::errors::GdalError,
    },
    #[error("geotransform {0} has zero cell area")]
    DegenerateTransform(String),
    #[error("raster {} has no bands", .0.display())]
    NoBands(PathBuf),
    #[error("reprojection of {} failed: {message}", path.display())]
    Reproject { path: PathBuf, message: String },
    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
