//! Fixed-size, non-overlapping batches of risk scores.

use crate::model::RiskScore;

#[derive(Debug, Clone)]
pub struct WindowAggregator {
    capacity: usize,
    buffer: Vec<f64>,
}

impl WindowAggregator {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append a score. The append that fills the window returns its mean and empties it.
    pub fn observe(&mut self, score: RiskScore) -> Option<f64> {
        self.buffer.push(score.percent());
        if self.buffer.len() < self.capacity {
            return None;
        }
        let mean = self.buffer.iter().sum::<f64>() / self.buffer.len() as f64;
        self.buffer.clear();
        Some(mean)
    }

    /// Scores waiting in the current window; always below capacity.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop a partial window.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
