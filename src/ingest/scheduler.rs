//! Repeating-timer scheduler on a single-threaded executor. Ingestion ticks, chart redraws and
//! control commands are multiplexed in one `select!`, so no two tick bodies ever overlap.

use super::{IngestionLoop, TickOutcome, TickStats};
use crate::config::SchedulerConfig;
use crate::model::Scorer;
use crate::presentation::Presenter;
use crate::storage::SampleSink;
use crate::transport::Transport;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Control surface commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Stop and leave the run loop
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    poll: Duration,
    refresh: Duration,
    max_windows: Option<u64>,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            poll: Duration::from_millis(config.poll_interval_ms.max(1)),
            refresh: Duration::from_millis(config.refresh_interval_ms.max(1)),
            max_windows: None,
        }
    }

    /// Shut down after this many window verdicts.
    pub fn with_max_windows(mut self, n: u64) -> Self {
        self.max_windows = Some(n);
        self
    }

    /// Drive the loop until Shutdown, a closed command channel, an exhausted transport,
    /// or the window limit.
    pub async fn run<T, S, K, P>(
        &self,
        ingest: &mut IngestionLoop<T, S, K, P>,
        mut commands: UnboundedReceiver<Command>,
    ) -> TickStats
    where
        T: Transport,
        S: Scorer,
        K: SampleSink,
        P: Presenter,
    {
        let mut poll = interval(self.poll);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresh = interval(self.refresh);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut verdicts: u64 = 0;

        loop {
            tokio::select! {
                biased;
                cmd = commands.recv() => match cmd {
                    Some(Command::Start) => {
                        if let Err(e) = ingest.start() {
                            warn!(error = %e, "start command failed");
                        }
                    }
                    Some(Command::Stop) => {
                        ingest.stop();
                    }
                    Some(Command::Shutdown) | None => {
                        ingest.stop();
                        break;
                    }
                },
                _ = poll.tick(), if ingest.monitor().is_listening() => {
                    if let TickOutcome::Verdict(_) = ingest.tick() {
                        verdicts += 1;
                        if self.max_windows.is_some_and(|max| verdicts >= max) {
                            info!(verdicts, "window limit reached");
                            ingest.stop();
                            break;
                        }
                    }
                    if ingest.transport().is_exhausted() {
                        info!("input exhausted");
                        ingest.stop();
                        break;
                    }
                }
                _ = refresh.tick() => ingest.refresh_chart(),
            }
        }
        ingest.stats()
    }
}
