//! One ingestion tick: read → parse → score → log → aggregate → verdict.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::features::SampleParser;
use crate::logging::StructuredLogger;
use crate::model::Scorer;
use crate::presentation::{ChannelHistory, Presenter, Status};
use crate::risk::{AlertMonitor, WindowVerdict};
use crate::storage::{SampleSink, VerdictHistory};
use crate::transport::Transport;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not listening; nothing read
    Inactive,
    /// No line waiting on the transport
    NoData,
    /// Empty line, skipped silently
    Blank,
    Malformed,
    ScoringFailed,
    TransportFailed,
    /// Sample accepted; window now holds `window_len` scores
    Accepted { window_len: usize },
    /// Sample accepted and it completed a window
    Verdict(WindowVerdict),
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TickStats {
    pub ticks: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub scoring_failed: u64,
    pub storage_failed: u64,
    pub history_failed: u64,
    pub windows: u64,
}

pub struct IngestionLoop<T, S, K, P> {
    monitor: AlertMonitor,
    parser: SampleParser,
    transport: T,
    scorer: S,
    sink: K,
    presenter: P,
    chart: ChannelHistory,
    history: Option<VerdictHistory>,
    stats: TickStats,
}

impl<T, S, K, P> IngestionLoop<T, S, K, P>
where
    T: Transport,
    S: Scorer,
    K: SampleSink,
    P: Presenter,
{
    pub fn new(config: &MonitorConfig, transport: T, scorer: S, sink: K, presenter: P) -> Self {
        Self {
            monitor: AlertMonitor::new(&config.window, config.alert.clone()),
            parser: SampleParser::new(config.transport.delimiter),
            transport,
            scorer,
            sink,
            presenter,
            chart: ChannelHistory::new(config.presentation.history_len),
            history: None,
            stats: TickStats::default(),
        }
    }

    /// Also record every window verdict to SQLite.
    pub fn with_history(mut self, history: VerdictHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Open the transport and begin listening. Returns Ok(false) if already listening.
    /// On transport failure the run state is left unchanged.
    pub fn start(&mut self) -> Result<bool> {
        if self.monitor.is_listening() {
            return Ok(false);
        }
        if let Err(e) = self.transport.open() {
            warn!(error = %e, state = ?self.monitor.state(), "start failed");
            return Err(e);
        }
        self.monitor.start();
        info!(session_id = self.monitor.session_id().unwrap_or_default(), "listening");
        self.presenter.on_status(Status::Listening);
        Ok(true)
    }

    /// Stop listening. Returns false when not listening.
    pub fn stop(&mut self) -> bool {
        if !self.monitor.stop() {
            return false;
        }
        info!(
            session_id = self.monitor.session_id().unwrap_or_default(),
            accepted = self.stats.accepted,
            windows = self.stats.windows,
            "stopped"
        );
        self.presenter.on_status(Status::Stopped);
        true
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.monitor.is_listening() {
            return TickOutcome::Inactive;
        }
        self.stats.ticks += 1;

        if !self.transport.bytes_available() {
            return TickOutcome::NoData;
        }
        let line = match self.transport.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return TickOutcome::NoData,
            Err(e) => {
                warn!(error = %e, "transport read failed");
                return TickOutcome::TransportFailed;
            }
        };

        let features = match self.parser.parse(&line) {
            Ok(Some(fv)) => fv,
            Ok(None) => return TickOutcome::Blank,
            Err(e) => {
                self.stats.malformed += 1;
                warn!(error = %e, "invalid data format; skipping");
                return TickOutcome::Malformed;
            }
        };

        let score = match self.scorer.score(&features) {
            Ok(s) => s,
            Err(e) => {
                self.stats.scoring_failed += 1;
                warn!(error = %e, "scoring failed; sample dropped");
                return TickOutcome::ScoringFailed;
            }
        };
        self.stats.accepted += 1;

        let [alpha, beta, theta, delta] = *features.values();
        debug!(alpha, beta, theta, delta, risk_pct = score.percent(), "received sample");

        if let Err(e) = self.sink.append(&features, score) {
            self.stats.storage_failed += 1;
            warn!(error = %e, "sample log append failed");
        }
        self.chart.publish(&features);

        let Some(verdict) = self.monitor.observe(score) else {
            return TickOutcome::Accepted {
                window_len: self.monitor.window_len(),
            };
        };
        self.stats.windows += 1;
        StructuredLogger::verdict(&verdict);
        if let Some(history) = &self.history {
            if let Err(e) = history.record(&verdict) {
                self.stats.history_failed += 1;
                warn!(error = %e, "verdict history write failed");
            }
        }
        self.presenter.on_verdict(&verdict);
        TickOutcome::Verdict(verdict)
    }

    /// Chart redraw tick.
    pub fn refresh_chart(&mut self) {
        self.presenter.refresh(&self.chart);
    }

    pub fn monitor(&self) -> &AlertMonitor {
        &self.monitor
    }

    pub fn chart(&self) -> &ChannelHistory {
        &self.chart
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn history(&self) -> Option<&VerdictHistory> {
        self.history.as_ref()
    }
}
