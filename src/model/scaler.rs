//! Standard scaler: `(x - mean) / scale` per band, parameters loaded from JSON.

use crate::error::{MonitorError, Result};
use crate::features::{FeatureVector, BAND_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; BAND_COUNT],
    pub scale: [f64; BAND_COUNT],
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::identity()
    }
}

impl StandardScaler {
    pub fn identity() -> Self {
        Self {
            mean: [0.0; BAND_COUNT],
            scale: [1.0; BAND_COUNT],
        }
    }

    /// Load parameters from path. A missing file yields the identity scaler.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "scaler parameters not found; using identity scaling");
            return Ok(Self::identity());
        }
        let data = std::fs::read_to_string(path)?;
        let scaler: StandardScaler = serde_json::from_str(&data)
            .map_err(|e| MonitorError::Config(format!("scaler {}: {e}", path.display())))?;
        if scaler.mean.iter().chain(&scaler.scale).any(|v| !v.is_finite()) {
            return Err(MonitorError::Config(format!(
                "scaler {}: parameters must be finite",
                path.display()
            )));
        }
        Ok(scaler)
    }

    pub fn transform(&self, features: &FeatureVector) -> [f32; BAND_COUNT] {
        let mut out = [0.0f32; BAND_COUNT];
        for (i, x) in features.values().iter().enumerate() {
            // zero-variance band
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            out[i] = ((x - self.mean[i]) / scale) as f32;
        }
        out
    }
}
