//! Reprojection of arbitrary rasters onto a model grid.
//!
//! Decoding, coordinate transformation and the resampling kernels are all
//! GDAL's; this module builds the destination grid, drives the warp and
//! applies the unit conversion.

pub mod error;
pub mod method;

pub use error::DataSourceError;
pub use method::ResamplingMethod;

use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;
use tracing::{debug, warn};

use crate::grid::{GridSpec, ResultGrid};

/// Result of one [`GridResampler::resample`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleOutcome {
    pub grid: ResultGrid,
    /// Set when the source was missing and `grid` holds the no-data fill.
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridResampler {
    scale_fallback: bool,
}

impl GridResampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also multiply the no-data fill by the conversion factor when the
    /// source is missing. Off by default: the fallback grid holds the raw
    /// sentinel while warped grids (including their nodata cells) are scaled.
    pub fn with_scale_fallback(mut self, scale_fallback: bool) -> Self {
        self.scale_fallback = scale_fallback;
        self
    }

    /// Reproject `source` onto `grid` with `method`, then multiply every
    /// cell by `conversion`.
    ///
    /// A missing source is not an error: a warning is logged and the grid
    /// comes back filled with the no-data value.
    pub fn resample<P: AsRef<Path>>(
        &self,
        source: P,
        grid: &GridSpec,
        method: ResamplingMethod,
        conversion: f64,
    ) -> Result<ResampleOutcome, DataSourceError> {
        let source = source.as_ref();

        if !source.exists() {
            warn!(
                source = %source.display(),
                "Data not processed, check that the file exists and path is correct"
            );
            let mut fallback = grid.fallback_grid();
            if self.scale_fallback {
                fallback *= conversion;
            }
            return Ok(ResampleOutcome {
                grid: fallback,
                fallback: true,
            });
        }

        let mut values = warp_onto_grid(source, grid, method)?;
        values *= conversion;

        Ok(ResampleOutcome {
            grid: values,
            fallback: false,
        })
    }
}

fn warp_onto_grid(
    source: &Path,
    grid: &GridSpec,
    method: ResamplingMethod,
) -> Result<ResultGrid, DataSourceError> {
    if grid.geotransform().is_degenerate() {
        return Err(DataSourceError::DegenerateTransform(
            grid.geotransform().to_string(),
        ));
    }

    let grid_wkt = SpatialRef::from_definition(grid.spatial_reference())
        .and_then(|srs| srs.to_wkt())
        .map_err(|source| DataSourceError::SpatialReference {
            definition: grid.spatial_reference().to_string(),
            source,
        })?;

    let raster = Dataset::open(source).map_err(|e| DataSourceError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    if raster.raster_count() == 0 {
        return Err(DataSourceError::NoBands(source.to_path_buf()));
    }

    let dest = make_grid(grid, &grid_wkt)?;

    debug!(
        source = %source.display(),
        source_size = ?raster.raster_size(),
        %method,
        rows = grid.nrow(),
        cols = grid.ncol(),
        "Reprojecting raster onto model grid"
    );
    reproject_image(&raster, &dest, &grid_wkt, method).map_err(|message| {
        DataSourceError::Reproject {
            path: source.to_path_buf(),
            message,
        }
    })?;

    let (ncol, nrow) = (grid.ncol(), grid.nrow());
    let buffer = dest
        .rasterband(1)?
        .read_as::<f64>((0, 0), (ncol, nrow), (ncol, nrow), None)?;

    Ok(Array2::from_shape_vec(grid.shape(), buffer.data().to_vec())?)
}

/// In-memory single-band `Float64` dataset matching `grid`, with every cell
/// set to the grid's no-data value.
pub fn make_grid(grid: &GridSpec, wkt: &str) -> Result<Dataset, DataSourceError> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut dataset = driver.create_with_band_type::<f64, _>("", grid.ncol(), grid.nrow(), 1)?;
    dataset.set_geo_transform(grid.geotransform().coefficients())?;
    dataset.set_projection(wkt)?;

    {
        let mut band = dataset.rasterband(1)?;
        band.set_no_data_value(Some(grid.nodata()))?;
        band.fill(grid.nodata(), None)?;
    }

    Ok(dataset)
}

// The safe wrapper only exposes a bilinear reprojection, so the kernel
// selection goes through GDALReprojectImage directly.
fn reproject_image(
    src: &Dataset,
    dst: &Dataset,
    dst_wkt: &str,
    method: ResamplingMethod,
) -> Result<(), String> {
    let src_projection = src.projection();
    // An unreferenced source is taken to already be in the grid's CRS.
    let src_wkt = if src_projection.is_empty() {
        None
    } else {
        Some(CString::new(src_projection).map_err(|e| e.to_string())?)
    };
    let dst_wkt = CString::new(dst_wkt).map_err(|e| e.to_string())?;

    let rv = unsafe {
        gdal_sys::CPLErrorReset();
        gdal_sys::GDALReprojectImage(
            src.c_dataset(),
            src_wkt.as_ref().map_or(ptr::null(), |wkt| wkt.as_ptr()),
            dst.c_dataset(),
            dst_wkt.as_ptr(),
            method.to_gdal(),
            0.0,
            0.0,
            None,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };

    if rv != gdal_sys::CPLErr::CE_None {
        return Err(last_cpl_error_msg());
    }
    Ok(())
}

fn last_cpl_error_msg() -> String {
    let msg = unsafe { CStr::from_ptr(gdal_sys::CPLGetLastErrorMsg()) };
    let msg = msg.to_string_lossy().trim().to_string();
    if msg.is_empty() {
        "GDALReprojectImage returned an error".to_string()
    } else {
        msg
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grid::GeoTransform;
    use gdal::raster::Buffer;
    use std::path::PathBuf;
    use tempfile::tempdir;

    pub(crate) const ALBERS: &str = "EPSG:5070";

    /// Writes a single-band Float64 GeoTIFF with row-major `values`.
    pub(crate) fn write_source_raster(
        path: &Path,
        size: (usize, usize),
        geotransform: [f64; 6],
        crs: &str,
        values: Vec<f64>,
        nodata: Option<f64>,
    ) {
        let (ncol, nrow) = size;
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut dataset = driver
            .create_with_band_type::<f64, _>(path, ncol, nrow, 1)
            .unwrap();
        dataset.set_geo_transform(&geotransform).unwrap();
        let wkt = SpatialRef::from_definition(crs).unwrap().to_wkt().unwrap();
        dataset.set_projection(&wkt).unwrap();

        let mut band = dataset.rasterband(1).unwrap();
        if nodata.is_some() {
            band.set_no_data_value(nodata).unwrap();
        }
        let mut buffer = Buffer::new((ncol, nrow), values);
        band.write((0, 0), (ncol, nrow), &mut buffer).unwrap();
    }

    /// 40x40 source of 10 m cells whose value is `row * 40 + col`,
    /// covering exactly a 10x10 grid of 40 m cells.
    pub(crate) fn fine_source(dir: &Path) -> (PathBuf, GridSpec) {
        let path = dir.join("fine.tif");
        let values = (0..40 * 40).map(|i| i as f64).collect();
        write_source_raster(
            &path,
            (40, 40),
            [500000.0, 10.0, 0.0, 2000000.0, 0.0, -10.0],
            ALBERS,
            values,
            None,
        );
        let grid = GridSpec::new(
            10,
            10,
            GeoTransform::north_up(500000.0, 2000000.0, 40.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();
        (path, grid)
    }

    #[test]
    fn test_missing_source_returns_unscaled_fallback() {
        let grid = GridSpec::new(
            10,
            10,
            GeoTransform::north_up(0.0, 100.0, 10.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let outcome = GridResampler::new()
            .resample("/does/not/exist.tif", &grid, ResamplingMethod::Min, 0.3048)
            .unwrap();

        assert!(outcome.fallback);
        assert_eq!(outcome.grid.dim(), (10, 10));
        assert!(outcome.grid.iter().all(|&v| v == -9999.0));
    }

    #[test]
    fn test_missing_source_scaled_when_requested() {
        let grid = GridSpec::new(
            10,
            10,
            GeoTransform::north_up(0.0, 100.0, 10.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let outcome = GridResampler::new()
            .with_scale_fallback(true)
            .resample("/does/not/exist.tif", &grid, ResamplingMethod::Min, 2.0)
            .unwrap();

        assert!(outcome.grid.iter().all(|&v| v == -19998.0));
    }

    #[test]
    fn test_min_of_fine_source() {
        let dir = tempdir().unwrap();
        let (path, grid) = fine_source(dir.path());

        let outcome = GridResampler::new()
            .resample(&path, &grid, ResamplingMethod::Min, 1.0)
            .unwrap();

        assert!(!outcome.fallback);
        assert_eq!(outcome.grid.dim(), (10, 10));
        for ((row, col), value) in outcome.grid.indexed_iter() {
            // Top-left source pixel of each 4x4 block holds the block minimum.
            let expected = (row * 4 * 40 + col * 4) as f64;
            assert_eq!(*value, expected, "cell ({row}, {col})");
        }
    }

    #[test]
    fn test_max_of_fine_source() {
        let dir = tempdir().unwrap();
        let (path, grid) = fine_source(dir.path());

        let outcome = GridResampler::new()
            .resample(&path, &grid, ResamplingMethod::Max, 1.0)
            .unwrap();

        for ((row, col), value) in outcome.grid.indexed_iter() {
            let expected = ((row * 4 + 3) * 40 + col * 4 + 3) as f64;
            assert_eq!(*value, expected, "cell ({row}, {col})");
        }
    }

    #[test]
    fn test_conversion_scales_every_cell() {
        let dir = tempdir().unwrap();
        let (path, grid) = fine_source(dir.path());
        let resampler = GridResampler::new();

        let raw = resampler
            .resample(&path, &grid, ResamplingMethod::Average, 1.0)
            .unwrap();
        let converted = resampler
            .resample(&path, &grid, ResamplingMethod::Average, crate::units::FT2M)
            .unwrap();

        for (r, c) in raw.grid.iter().zip(converted.grid.iter()) {
            assert!((r * crate::units::FT2M - c).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resample_is_idempotent() {
        let dir = tempdir().unwrap();
        let (path, grid) = fine_source(dir.path());
        let resampler = GridResampler::new();

        let first = resampler
            .resample(&path, &grid, ResamplingMethod::Bilinear, 0.5)
            .unwrap();
        let second = resampler
            .resample(&path, &grid, ResamplingMethod::Bilinear, 0.5)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_uncovered_cells_keep_nodata_and_are_scaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.tif");
        // Source covers only the western half of the grid.
        write_source_raster(
            &path,
            (5, 10),
            [0.0, 10.0, 0.0, 100.0, 0.0, -10.0],
            ALBERS,
            vec![1.0; 50],
            None,
        );
        let grid = GridSpec::new(
            10,
            10,
            GeoTransform::north_up(0.0, 100.0, 10.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let outcome = GridResampler::new()
            .resample(&path, &grid, ResamplingMethod::NearestNeighbour, 2.0)
            .unwrap();

        assert_eq!(outcome.grid.dim(), (10, 10));
        for ((_, col), value) in outcome.grid.indexed_iter() {
            if col < 5 {
                assert_eq!(*value, 2.0);
            } else {
                assert_eq!(*value, -19998.0);
            }
        }
    }

    #[test]
    fn test_source_nodata_pixels_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holes.tif");
        let mut values: Vec<f64> = (0..16).map(|i| i as f64 + 10.0).collect();
        values[5] = -1.0;
        write_source_raster(
            &path,
            (4, 4),
            [0.0, 10.0, 0.0, 40.0, 0.0, -10.0],
            ALBERS,
            values,
            Some(-1.0),
        );
        let grid = GridSpec::new(
            1,
            1,
            GeoTransform::north_up(0.0, 40.0, 40.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let outcome = GridResampler::new()
            .resample(&path, &grid, ResamplingMethod::Min, 1.0)
            .unwrap();

        assert_eq!(outcome.grid[[0, 0]], 10.0);
    }

    #[test]
    fn test_reprojects_between_crs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("utm.tif");
        // 100x100 UTM 16N cells of 30 m, constant value.
        write_source_raster(
            &path,
            (100, 100),
            [400000.0, 30.0, 0.0, 4800000.0, 0.0, -30.0],
            "EPSG:32616",
            vec![42.0; 100 * 100],
            None,
        );

        let utm = SpatialRef::from_definition("EPSG:32616").unwrap();
        let albers = SpatialRef::from_definition(ALBERS).unwrap();
        let transform = gdal::spatial_ref::CoordTransform::new(&utm, &albers).unwrap();
        let mut xs = [401500.0];
        let mut ys = [4798500.0];
        let mut zs = [0.0];
        transform
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .unwrap();

        // 5x5 grid of 100 m cells centred on the middle of the source.
        let grid = GridSpec::new(
            5,
            5,
            GeoTransform::north_up(xs[0] - 250.0, ys[0] + 250.0, 100.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let outcome = GridResampler::new()
            .resample(&path, &grid, ResamplingMethod::NearestNeighbour, 1.0)
            .unwrap();

        assert_eq!(outcome.grid.dim(), (5, 5));
        assert!(outcome.grid.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_corrupt_source_is_data_source_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.tif");
        std::fs::write(&path, b"not a raster").unwrap();
        let grid = GridSpec::new(
            2,
            2,
            GeoTransform::north_up(0.0, 20.0, 10.0),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let result = GridResampler::new().resample(&path, &grid, ResamplingMethod::Min, 1.0);

        assert!(matches!(result, Err(DataSourceError::Open { .. })));
    }

    #[test]
    fn test_invalid_spatial_reference() {
        let dir = tempdir().unwrap();
        let (path, _) = fine_source(dir.path());
        let grid = GridSpec::new(
            2,
            2,
            GeoTransform::north_up(0.0, 20.0, 10.0),
            "not a crs",
            -9999.0,
        )
        .unwrap();

        let result = GridResampler::new().resample(&path, &grid, ResamplingMethod::Min, 1.0);

        assert!(matches!(
            result,
            Err(DataSourceError::SpatialReference { .. })
        ));
    }

    #[test]
    fn test_degenerate_transform() {
        let dir = tempdir().unwrap();
        let (path, _) = fine_source(dir.path());
        let grid = GridSpec::new(
            2,
            2,
            GeoTransform::new([0.0, 0.0, 0.0, 0.0, 0.0, -10.0]),
            ALBERS,
            -9999.0,
        )
        .unwrap();

        let result = GridResampler::new().resample(&path, &grid, ResamplingMethod::Min, 1.0);

        assert!(matches!(result, Err(DataSourceError::DegenerateTransform(_))));
    }

    #[test]
    fn test_make_grid_is_filled_with_nodata() {
        let grid = GridSpec::new(
            3,
            2,
            GeoTransform::north_up(0.0, 20.0, 10.0),
            ALBERS,
            -1.5,
        )
        .unwrap();
        let wkt = SpatialRef::from_definition(ALBERS)
            .unwrap()
            .to_wkt()
            .unwrap();

        let dataset = make_grid(&grid, &wkt).unwrap();

        assert_eq!(dataset.raster_size(), (3, 2));
        let band = dataset.rasterband(1).unwrap();
        assert_eq!(band.no_data_value(), Some(-1.5));
        let buffer = band.read_as::<f64>((0, 0), (3, 2), (3, 2), None).unwrap();
        assert!(buffer.data().iter().all(|&v| v == -1.5));
    }
}
