//! Band feature vectors and the line parser that produces them.

mod parser;

pub use parser::SampleParser;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of signal bands per sample.
pub const BAND_COUNT: usize = 4;

/// Signal band, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Alpha,
    Beta,
    Theta,
    Delta,
}

impl Band {
    pub const ALL: [Band; BAND_COUNT] = [Band::Alpha, Band::Beta, Band::Theta, Band::Delta];

    pub fn index(self) -> usize {
        match self {
            Band::Alpha => 0,
            Band::Beta => 1,
            Band::Theta => 2,
            Band::Delta => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Alpha => "Alpha",
            Band::Beta => "Beta",
            Band::Theta => "Theta",
            Band::Delta => "Delta",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted reading: four finite values ordered Alpha, Beta, Theta, Delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; BAND_COUNT],
}

impl FeatureVector {
    /// Returns None if any value is NaN or infinite.
    pub fn new(values: [f64; BAND_COUNT]) -> Option<Self> {
        values
            .iter()
            .all(|v| v.is_finite())
            .then_some(Self { values })
    }

    pub fn values(&self) -> &[f64; BAND_COUNT] {
        &self.values
    }

    pub fn band(&self, band: Band) -> f64 {
        self.values[band.index()]
    }
}
