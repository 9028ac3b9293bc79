//! Unit conversion factors applied after resampling.
//!
//! Model arrays are in metres; source rasters often are not.

use serde::{Deserialize, Serialize};

/// U.S. survey feet to metres (1200/3937).
pub const FT2M: f64 = 0.3048006096012192;
pub const MM2M: f64 = 0.001;
pub const CM2M: f64 = 0.01;
/// International inches to metres.
pub const IN2M: f64 = 0.0254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedConversion {
    None,
    Ft2m,
    Mm2m,
    Cm2m,
    In2m,
}

impl NamedConversion {
    pub fn factor(&self) -> f64 {
        match self {
            NamedConversion::None => 1.0,
            NamedConversion::Ft2m => FT2M,
            NamedConversion::Mm2m => MM2M,
            NamedConversion::Cm2m => CM2M,
            NamedConversion::In2m => IN2M,
        }
    }
}

/// Multiplicative factor given either as a number or by name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Conversion {
    Factor(f64),
    Named(NamedConversion),
}

impl Conversion {
    pub fn factor(&self) -> f64 {
        match self {
            Conversion::Factor(f) => *f,
            Conversion::Named(named) => named.factor(),
        }
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Conversion::Factor(1.0)
    }
}
