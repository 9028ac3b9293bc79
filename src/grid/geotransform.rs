use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Affine geotransform in GDAL coefficient order:
/// `[x0, dx, rx, y0, ry, dy]`.
///
/// A cell at (`row`, `col`) has its top-left corner at
/// `x = x0 + col * dx + row * rx`, `y = y0 + col * ry + row * dy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self(coefficients)
    }

    /// North-up transform with square cells, as produced by the model
    /// grid notebooks.
    pub fn north_up(x0: f64, y0: f64, cell_size: f64) -> Self {
        Self([x0, cell_size, 0.0, y0, 0.0, -cell_size])
    }

    pub fn coefficients(&self) -> &[f64; 6] {
        &self.0
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.0[0], self.0[3])
    }

    /// (dx, dy); dy is negative for north-up grids.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.0[1], self.0[5])
    }

    /// True when the linear part cannot be inverted, i.e. cells have no area.
    pub fn is_degenerate(&self) -> bool {
        let det = self.0[1] * self.0[5] - self.0[2] * self.0[4];
        det == 0.0 || !det.is_finite()
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(value: [f64; 6]) -> Self {
        Self(value)
    }
}

// Parses the bracketed literal handed over by the notebooks, e.g.
// `[500000.0,250.0,0,4800000.0,0,-250.0]`.
impl FromStr for GeoTransform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::Geotransform {
            literal: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| invalid("expected a literal enclosed in brackets".to_string()))?;

        let values = inner
            .split(',')
            .map(|token| {
                let token = token.trim();
                token
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("`{token}` is not a number ({e})")))
            })
            .collect::<Result<Vec<f64>, ConfigError>>()?;

        let coefficients: [f64; 6] = values
            .try_into()
            .map_err(|v: Vec<f64>| invalid(format!("expected 6 coefficients, found {}", v.len())))?;

        Ok(Self(coefficients))
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "[{a:?},{b:?},{c:?},{d:?},{e:?},{g:?}]")
    }
}

// Accepts either a JSON array of six numbers or the bracketed literal string.
impl<'de> Deserialize<'de> for GeoTransform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum GeoTransformHelper {
            Coefficients([f64; 6]),
            Literal(String),
        }

        match GeoTransformHelper::deserialize(deserializer)? {
            GeoTransformHelper::Coefficients(c) => Ok(Self(c)),
            GeoTransformHelper::Literal(literal) => literal.parse().map_err(D::Error::custom),
        }
    }
}
