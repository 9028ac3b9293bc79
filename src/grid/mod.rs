//! Target model grid geometry.
//!
//! A [`GridSpec`] is built by the caller before each resampling call and
//! passed explicitly; nothing about the grid lives in process-wide state.

use ndarray::Array2;
use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::config::ConfigError;

pub mod geotransform;
pub use geotransform::GeoTransform;

/// Rows × columns of cell values aligned to a [`GridSpec`].
pub type ResultGrid = Array2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    ncol: usize,
    nrow: usize,
    geotransform: GeoTransform,
    spatial_reference: String,
    nodata: f64,
}

impl GridSpec {
    /// Signed dimensions so that negative values coming from the command line
    /// are reported as a configuration error rather than wrapped. Each axis is
    /// capped at `i32::MAX`, the largest raster size GDAL can address.
    pub fn new(
        ncol: i64,
        nrow: i64,
        geotransform: GeoTransform,
        spatial_reference: impl Into<String>,
        nodata: f64,
    ) -> Result<Self, ConfigError> {
        let max = i64::from(i32::MAX);
        if !(1..=max).contains(&ncol) || !(1..=max).contains(&nrow) {
            return Err(ConfigError::Dimension { ncol, nrow });
        }
        // The result array must be addressable as one allocation.
        let bytes = (ncol as usize)
            .checked_mul(nrow as usize)
            .and_then(|cells| cells.checked_mul(size_of::<f64>()));
        if !bytes.is_some_and(|bytes| bytes <= isize::MAX as usize) {
            return Err(ConfigError::Dimension { ncol, nrow });
        }

        Ok(Self {
            ncol: ncol as usize,
            nrow: nrow as usize,
            geotransform,
            spatial_reference: spatial_reference.into(),
            nodata,
        })
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// (rows, columns), the shape of every [`ResultGrid`] for this grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    pub fn geotransform(&self) -> &GeoTransform {
        &self.geotransform
    }

    pub fn spatial_reference(&self) -> &str {
        &self.spatial_reference
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Grid uniformly filled with the no-data value.
    pub fn fallback_grid(&self) -> ResultGrid {
        Array2::from_elem(self.shape(), self.nodata)
    }
}

impl<'de> Deserialize<'de> for GridSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GridSpecHelper {
            ncol: i64,
            nrow: i64,
            geotransform: GeoTransform,
            spatial_reference: String,
            nodata: f64,
        }

        let helper = GridSpecHelper::deserialize(deserializer)?;

        GridSpec::new(
            helper.ncol,
            helper.nrow,
            helper.geotransform,
            helper.spatial_reference,
            helper.nodata,
        )
        .map_err(D::Error::custom)
    }
}
