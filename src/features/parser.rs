//! Raw line → FeatureVector.

use super::{FeatureVector, BAND_COUNT};
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone)]
pub struct SampleParser {
    delimiter: char,
}

impl Default for SampleParser {
    fn default() -> Self {
        Self::new(',')
    }
}

impl SampleParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Parse one line. `Ok(None)` for a blank line, which carries no sample.
    pub fn parse(&self, line: &str) -> Result<Option<FeatureVector>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(self.delimiter).collect();
        if fields.len() != BAND_COUNT {
            return Err(MonitorError::malformed(
                line,
                format!("expected {BAND_COUNT} fields, got {}", fields.len()),
            ));
        }

        let mut values = [0.0f64; BAND_COUNT];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .trim()
                .parse::<f64>()
                .map_err(|e| MonitorError::malformed(line, format!("field {field:?}: {e}")))?;
        }

        FeatureVector::new(values)
            .map(Some)
            .ok_or_else(|| MonitorError::malformed(line, "non-finite value"))
    }
}
