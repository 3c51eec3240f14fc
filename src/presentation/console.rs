//! Terminal presenter: status through tracing, verdicts as text or JSON lines on a writer.

use super::{ChannelHistory, Presenter, Status};
use crate::features::Band;
use crate::logging::VerdictEvent;
use crate::risk::{Verdict, WindowVerdict};
use std::io::Write;
use tracing::{debug, info, warn};

/// Points per redrawn band curve.
const CHART_POINTS: usize = 100;

pub struct ConsolePresenter<W: Write> {
    out: W,
    json: bool,
    last_status: Option<Status>,
    redraws: u64,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(std::io::stdout(), json)
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            last_status: None,
            redraws: 0,
        }
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn on_status(&mut self, status: Status) {
        info!(status = status.message(), color = status.color(), "status");
        self.last_status = Some(status);
    }

    fn on_verdict(&mut self, v: &WindowVerdict) {
        let status = Status::Verdict(v.verdict);
        self.on_status(status);
        let written = if self.json {
            VerdictEvent::from_window(v, Some(status.message())).write_line(&mut self.out)
        } else {
            let flag = u8::from(v.verdict == Verdict::AtRisk);
            writeln!(
                self.out,
                "{} (final prediction {flag}, mean risk {:.2}% over {} samples)",
                status.message(),
                v.mean,
                v.samples
            )
        };
        if let Err(e) = written.and_then(|()| self.out.flush()) {
            warn!(error = %e, "verdict output failed");
        }
    }

    fn refresh(&mut self, history: &ChannelHistory) {
        if history.is_empty() {
            return;
        }
        self.redraws += 1;
        for band in Band::ALL {
            let Some(curve) = history.waveform(band, CHART_POINTS) else {
                continue;
            };
            let peak = curve.iter().fold(0.0f64, |m, y| m.max(y.abs()));
            debug!(redraw = self.redraws, band = %band, latest = ?history.latest(band), peak, "chart");
        }
    }
}
