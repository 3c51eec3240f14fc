//! Scoring collaborators: feature scaler and classifier, combined behind [`Scorer`].

mod onnx;
mod scaler;

pub use onnx::OnnxScorer;
pub use scaler::StandardScaler;

use crate::config::CLASSIFICATION_CUT;
use crate::error::ScoringError;
use crate::features::FeatureVector;
use crate::risk::Verdict;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifier risk probability expressed as a percentage in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RiskScore(f64);

impl RiskScore {
    /// From a probability in [0, 1]; clamped. NaN is rejected.
    pub fn from_probability(p: f64) -> Result<Self, ScoringError> {
        if p.is_nan() {
            return Err(ScoringError::NonFinite);
        }
        Ok(Self((p * 100.0).clamp(0.0, 100.0)))
    }

    /// From a percentage; clamped to [0, 100]. NaN is rejected.
    pub fn from_percent(pct: f64) -> Result<Self, ScoringError> {
        if pct.is_nan() {
            return Err(ScoringError::NonFinite);
        }
        Ok(Self(pct.clamp(0.0, 100.0)))
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    pub fn probability(self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Maps a feature vector to a risk score. Implementations must be deterministic for a fixed model.
pub trait Scorer {
    fn score(&self, features: &FeatureVector) -> Result<RiskScore, ScoringError>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, features: &FeatureVector) -> Result<RiskScore, ScoringError> {
        (**self).score(features)
    }
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn score(&self, features: &FeatureVector) -> Result<RiskScore, ScoringError> {
        (**self).score(features)
    }
}

/// Single-sample decision: AtRisk when the probability reaches the 0.5 cut.
pub fn classify_probability(score: RiskScore) -> Verdict {
    if score.probability() >= CLASSIFICATION_CUT {
        Verdict::AtRisk
    } else {
        Verdict::Safe
    }
}
