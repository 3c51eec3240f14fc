//! Log setup plus the verdict record: every completed window is logged through tracing and,
//! when enabled, written as one JSON object per line (ndjson) for downstream tooling.

use crate::config::LogConfig;
use crate::risk::{Verdict, WindowVerdict};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::io::{self, Write};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Level used when `log.level` is not a valid filter directive.
const FALLBACK_LEVEL: &str = "info";

#[derive(Serialize)]
pub struct VerdictEvent<'a> {
    pub ts: String,
    pub kind: &'a str,
    pub session_id: &'a str,
    pub mean_risk: f64,
    pub verdict: &'a str,
    pub samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

impl<'a> VerdictEvent<'a> {
    pub fn from_window(v: &'a WindowVerdict, message: Option<&'a str>) -> Self {
        let ts = Utc
            .timestamp_millis_opt(v.ts)
            .single()
            .unwrap_or_else(Utc::now)
            .to_rfc3339();
        Self {
            ts,
            kind: "window_verdict",
            session_id: &v.session_id,
            mean_risk: v.mean,
            verdict: v.verdict.as_str(),
            samples: v.samples,
            message,
        }
    }

    /// Write as a single ndjson line.
    pub fn write_line(&self, w: &mut impl Write) -> io::Result<()> {
        let line = serde_json::to_string(self).map_err(io::Error::from)?;
        writeln!(w, "{line}")
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr. `RUST_LOG` overrides `log.level`.
    /// Returns false if a subscriber was already installed.
    pub fn init(log: &LogConfig) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&log.level))
            .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL));
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false);
        let installed = if log.json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json().flatten_event(true))
                .try_init()
        } else {
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        };
        installed.is_ok()
    }

    /// Log a consumed window. AtRisk goes out at warn so it survives a quieter filter.
    pub fn verdict(v: &WindowVerdict) {
        match v.verdict {
            Verdict::AtRisk => warn!(
                session_id = %v.session_id,
                mean = v.mean,
                samples = v.samples,
                verdict = v.verdict.as_str(),
                "window verdict"
            ),
            _ => info!(
                session_id = %v.session_id,
                mean = v.mean,
                samples = v.samples,
                verdict = v.verdict.as_str(),
                "window verdict"
            ),
        }
    }
}
