use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::grid::GridSpec;
use crate::resample::ResamplingMethod;
use crate::units::Conversion;

pub mod error;
pub use error::ConfigError;

/// One source raster to put on the model grid.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RasterJob {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub method: ResamplingMethod,
    #[serde(default)]
    pub conversion: Conversion,
    /// Relative to the output directory; defaults to `<name>.txt`.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl RasterJob {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method: ResamplingMethod::default(),
            conversion: Conversion::default(),
            output: None,
        }
    }

    pub fn output_file(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.txt", self.name)))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    grid: GridSpec,
    output_directory: PathBuf,
    parallel: bool,
    scale_fallback: bool,
    rasters: Vec<RasterJob>,
}

// Deserializes through a helper so the grid is validated and raster names
// and outputs are unique before a Config exists.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            grid: GridSpec,
            #[serde(default)]
            output_directory: Option<PathBuf>,
            #[serde(default)]
            parallel: bool,
            #[serde(default)]
            scale_fallback: bool,
            rasters: Vec<RasterJob>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let output_directory = helper
            .output_directory
            .unwrap_or_else(|| PathBuf::from("."));
        check_rasters(&output_directory, &helper.rasters).map_err(D::Error::custom)?;

        Ok(Config {
            grid: helper.grid,
            output_directory,
            parallel: helper.parallel,
            scale_fallback: helper.scale_fallback,
            rasters: helper.rasters,
        })
    }
}

/// Every job needs its own name and its own output file, otherwise one
/// array would silently overwrite another.
fn check_rasters(output_directory: &Path, rasters: &[RasterJob]) -> Result<(), ConfigError> {
    if rasters.is_empty() {
        return Err(ConfigError::NoRasters);
    }

    let mut names = HashSet::new();
    let mut outputs = HashSet::new();
    for raster in rasters {
        if !names.insert(raster.name.as_str()) {
            return Err(ConfigError::DuplicateRaster(raster.name.clone()));
        }
        let output = output_directory.join(raster.output_file());
        if outputs.contains(&output) {
            return Err(ConfigError::DuplicateOutput(output));
        }
        outputs.insert(output);
    }

    Ok(())
}

impl Config {
    pub fn new(
        grid: GridSpec,
        output_directory: impl Into<PathBuf>,
        rasters: Vec<RasterJob>,
    ) -> Result<Self, ConfigError> {
        let output_directory = output_directory.into();
        check_rasters(&output_directory, &rasters)?;

        Ok(Self {
            grid,
            output_directory,
            parallel: false,
            scale_fallback: false,
            rasters,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_scale_fallback(mut self, scale_fallback: bool) -> Self {
        self.scale_fallback = scale_fallback;
        self
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn scale_fallback(&self) -> bool {
        self.scale_fallback
    }

    pub fn rasters(&self) -> &[RasterJob] {
        &self.rasters
    }

    pub fn output_path(&self, job: &RasterJob) -> PathBuf {
        self.output_directory.join(job.output_file())
    }
}
