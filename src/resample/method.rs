use gdal_sys::GDALResampleAlg;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

use crate::config::ConfigError;

/// How overlapping source pixels are combined into one destination cell.
///
/// Kernels (bilinear, cubic, ...) interpolate around the cell center;
/// statistics (average, min, ...) aggregate every non-nodata source pixel
/// that falls inside the cell footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResamplingMethod {
    NearestNeighbour,
    Bilinear,
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Mode,
    Max,
    #[default]
    Min,
    Median,
    FirstQuartile,
    ThirdQuartile,
}

impl ResamplingMethod {
    pub const ALL: [ResamplingMethod; 12] = [
        ResamplingMethod::NearestNeighbour,
        ResamplingMethod::Bilinear,
        ResamplingMethod::Cubic,
        ResamplingMethod::CubicSpline,
        ResamplingMethod::Lanczos,
        ResamplingMethod::Average,
        ResamplingMethod::Mode,
        ResamplingMethod::Max,
        ResamplingMethod::Min,
        ResamplingMethod::Median,
        ResamplingMethod::FirstQuartile,
        ResamplingMethod::ThirdQuartile,
    ];

    /// Short name as used by `gdalwarp -r`.
    pub fn name(&self) -> &'static str {
        match self {
            ResamplingMethod::NearestNeighbour => "near",
            ResamplingMethod::Bilinear => "bilinear",
            ResamplingMethod::Cubic => "cubic",
            ResamplingMethod::CubicSpline => "cubicspline",
            ResamplingMethod::Lanczos => "lanczos",
            ResamplingMethod::Average => "average",
            ResamplingMethod::Mode => "mode",
            ResamplingMethod::Max => "max",
            ResamplingMethod::Min => "min",
            ResamplingMethod::Median => "med",
            ResamplingMethod::FirstQuartile => "q1",
            ResamplingMethod::ThirdQuartile => "q3",
        }
    }

    pub fn to_gdal(&self) -> GDALResampleAlg::Type {
        match self {
            ResamplingMethod::NearestNeighbour => GDALResampleAlg::GRA_NearestNeighbour,
            ResamplingMethod::Bilinear => GDALResampleAlg::GRA_Bilinear,
            ResamplingMethod::Cubic => GDALResampleAlg::GRA_Cubic,
            ResamplingMethod::CubicSpline => GDALResampleAlg::GRA_CubicSpline,
            ResamplingMethod::Lanczos => GDALResampleAlg::GRA_Lanczos,
            ResamplingMethod::Average => GDALResampleAlg::GRA_Average,
            ResamplingMethod::Mode => GDALResampleAlg::GRA_Mode,
            ResamplingMethod::Max => GDALResampleAlg::GRA_Max,
            ResamplingMethod::Min => GDALResampleAlg::GRA_Min,
            ResamplingMethod::Median => GDALResampleAlg::GRA_Med,
            ResamplingMethod::FirstQuartile => GDALResampleAlg::GRA_Q1,
            ResamplingMethod::ThirdQuartile => GDALResampleAlg::GRA_Q3,
        }
    }
}

impl FromStr for ResamplingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "near" | "nearest" | "nearestneighbour" | "nearest_neighbour" => {
                Ok(ResamplingMethod::NearestNeighbour)
            }
            "bilinear" => Ok(ResamplingMethod::Bilinear),
            "cubic" => Ok(ResamplingMethod::Cubic),
            "cubicspline" | "cubic_spline" => Ok(ResamplingMethod::CubicSpline),
            "lanczos" => Ok(ResamplingMethod::Lanczos),
            "average" | "mean" => Ok(ResamplingMethod::Average),
            "mode" => Ok(ResamplingMethod::Mode),
            "max" => Ok(ResamplingMethod::Max),
            "min" => Ok(ResamplingMethod::Min),
            "med" | "median" => Ok(ResamplingMethod::Median),
            "q1" => Ok(ResamplingMethod::FirstQuartile),
            "q3" => Ok(ResamplingMethod::ThirdQuartile),
            _ => Err(ConfigError::ResamplingMethod(s.to_string())),
        }
    }
}

impl Display for ResamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ResamplingMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ResamplingMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
