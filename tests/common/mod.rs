#![allow(dead_code)]

use stroke_monitor::{
    config::MonitorConfig,
    ingest::IngestionLoop,
    presentation::{ChannelHistory, Presenter, Status},
    risk::WindowVerdict,
    storage::MemorySink,
    transport::MemoryTransport,
    FeatureVector, RiskScore, Scorer, ScoringError,
};

/// Uses the Alpha band as the risk percentage; a negative Alpha fails to score.
pub struct AlphaScorer;

impl Scorer for AlphaScorer {
    fn score(&self, features: &FeatureVector) -> Result<RiskScore, ScoringError> {
        let alpha = features.values()[0];
        if alpha < 0.0 {
            return Err(ScoringError::Inference("negative alpha".into()));
        }
        RiskScore::from_percent(alpha)
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub statuses: Vec<Status>,
    pub verdicts: Vec<WindowVerdict>,
    pub refreshes: usize,
}

impl Presenter for RecordingPresenter {
    fn on_status(&mut self, status: Status) {
        self.statuses.push(status);
    }

    fn on_verdict(&mut self, verdict: &WindowVerdict) {
        self.verdicts.push(verdict.clone());
    }

    fn refresh(&mut self, _history: &ChannelHistory) {
        self.refreshes += 1;
    }
}

pub type TestLoop = IngestionLoop<MemoryTransport, AlphaScorer, MemorySink, RecordingPresenter>;

pub fn test_loop(config: &MonitorConfig) -> TestLoop {
    IngestionLoop::new(
        config,
        MemoryTransport::new(),
        AlphaScorer,
        MemorySink::default(),
        RecordingPresenter::default(),
    )
}

/// A line whose score (via `AlphaScorer`) is `risk`.
pub fn line(risk: f64) -> String {
    format!("{risk},0.7,0.2,0.6")
}

pub fn feed(lp: &mut TestLoop, risk: f64, n: usize) {
    for _ in 0..n {
        lp.transport_mut().push_line(line(risk));
    }
}
