//! ONNX Runtime classifier. Input: [1, 4] f32 scaled bands. Output: risk probability.
//! If the model file is missing the scorer still loads, but every sample fails to score.

use super::{RiskScore, Scorer, StandardScaler};
use crate::error::ScoringError;
use crate::features::{FeatureVector, BAND_COUNT};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

/// Output tensor name used by converted scikit-learn classifiers.
const PROBABILITY_OUTPUT: &str = "probabilities";

struct LoadedModel {
    session: Mutex<Session>,
    output_name: String,
}

pub struct OnnxScorer {
    model: Option<LoadedModel>,
    scaler: StandardScaler,
}

impl OnnxScorer {
    /// Load model from path. If path is missing, scoring runs in unavailable mode.
    pub fn load(path: &Path, scaler: StandardScaler) -> Result<Self, ScoringError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "ONNX model not found; samples will not be scored");
            return Ok(Self {
                model: None,
                scaler,
            });
        }

        let session = Session::builder()
            .map_err(|e| ScoringError::Inference(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ScoringError::Inference(format!("optimization level: {e}")))?
            .commit_from_file(path)
            .map_err(|e| ScoringError::Inference(format!("load {}: {e}", path.display())))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| ScoringError::Inference("model declares no outputs".into()))?;

        tracing::info!(path = %path.display(), output = %output_name, "ONNX model loaded");

        Ok(Self {
            model: Some(LoadedModel {
                session: Mutex::new(session),
                output_name,
            }),
            scaler,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn predict_probability(&self, model: &LoadedModel, scaled: [f32; BAND_COUNT]) -> Result<f64, ScoringError> {
        let arr = Array2::from_shape_vec((1, BAND_COUNT), scaled.to_vec())
            .map_err(|e| ScoringError::Inference(e.to_string()))?;
        let input = Value::from_array(arr).map_err(|e| ScoringError::Inference(e.to_string()))?;

        let mut session = model
            .session
            .lock()
            .map_err(|_| ScoringError::Inference("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ScoringError::Inference(e.to_string()))?;
        let out = outputs
            .get(&model.output_name)
            .ok_or_else(|| ScoringError::Inference(format!("missing output {}", model.output_name)))?;
        let (_, data) = out
            .try_extract_tensor::<f32>()
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        // [p_safe, p_risk] rows, or a bare risk probability
        let p = match data {
            [_, p_risk, ..] => *p_risk,
            [p] => *p,
            [] => return Err(ScoringError::Inference("empty output tensor".into())),
        };
        Ok(f64::from(p))
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &FeatureVector) -> Result<RiskScore, ScoringError> {
        let Some(ref model) = self.model else {
            return Err(ScoringError::ModelUnavailable);
        };
        let scaled = self.scaler.transform(features);
        let p = self.predict_probability(model, scaled)?;
        RiskScore::from_probability(p)
    }
}
