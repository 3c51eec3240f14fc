//! Alert state machine: run state, window aggregation and the debounced verdict.

use super::WindowAggregator;
use crate::config::{AlertConfig, WindowConfig, WindowPolicy};
use crate::model::RiskScore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Listening,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Unknown,
    Safe,
    AtRisk,
}

impl Verdict {
    pub fn from_mean(mean: f64, config: &AlertConfig) -> Self {
        if mean >= config.threshold_pct {
            Verdict::AtRisk
        } else {
            Verdict::Safe
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unknown => "unknown",
            Verdict::Safe => "safe",
            Verdict::AtRisk => "at_risk",
        }
    }
}

/// Verdict produced by one consumed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowVerdict {
    pub session_id: String,
    pub mean: f64,
    pub verdict: Verdict,
    pub samples: usize,
    pub ts: i64,
}

/// One stateful object per monitor: owned by the ingestion loop, never global.
#[derive(Debug)]
pub struct AlertMonitor {
    state: RunState,
    verdict: Verdict,
    window: WindowAggregator,
    policy: WindowPolicy,
    alert: AlertConfig,
    session_id: Option<String>,
}

impl AlertMonitor {
    pub fn new(window: &WindowConfig, alert: AlertConfig) -> Self {
        Self {
            state: RunState::Idle,
            verdict: Verdict::Unknown,
            window: WindowAggregator::new(window.capacity),
            policy: window.policy,
            alert,
            session_id: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn window_capacity(&self) -> usize {
        self.window.capacity()
    }

    pub fn is_listening(&self) -> bool {
        self.state == RunState::Listening
    }

    /// Id of the current (or last) listening session
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Idle/Stopped → Listening. Returns false when already listening.
    pub fn start(&mut self) -> bool {
        if self.state == RunState::Listening {
            return false;
        }
        if self.policy == WindowPolicy::DiscardOnStop {
            self.window.reset();
        }
        self.verdict = Verdict::Unknown;
        self.state = RunState::Listening;
        self.session_id = Some(Uuid::new_v4().to_string());
        true
    }

    /// Listening → Stopped. Returns false (and changes nothing) in any other state.
    pub fn stop(&mut self) -> bool {
        if self.state != RunState::Listening {
            return false;
        }
        self.state = RunState::Stopped;
        if self.policy == WindowPolicy::DiscardOnStop && !self.window.is_empty() {
            tracing::debug!(discarded = self.window.len(), "partial window discarded on stop");
            self.window.reset();
        }
        true
    }

    /// Set the verdict from a window mean. Ignored unless listening.
    pub fn on_window_mean(&mut self, mean: f64) -> Option<Verdict> {
        if !self.is_listening() {
            return None;
        }
        self.verdict = Verdict::from_mean(mean, &self.alert);
        Some(self.verdict)
    }

    /// Feed one score; on the window-filling score, returns the new verdict.
    pub fn observe(&mut self, score: RiskScore) -> Option<WindowVerdict> {
        if !self.is_listening() {
            return None;
        }
        let mean = self.window.observe(score)?;
        let verdict = self.on_window_mean(mean)?;
        Some(WindowVerdict {
            session_id: self.session_id.clone().unwrap_or_default(),
            mean,
            verdict,
            samples: self.window.capacity(),
            ts: Utc::now().timestamp_millis(),
        })
    }

    pub fn alert_config(&self) -> &AlertConfig {
        &self.alert
    }
}

/// Handle for multi-threaded hosts: a single mutex guards every transition, so
/// observe-then-reset stays atomic.
#[derive(Debug, Clone)]
pub struct SharedMonitor {
    inner: Arc<Mutex<AlertMonitor>>,
}

impl SharedMonitor {
    pub fn new(monitor: AlertMonitor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
        }
    }

    /// Run `f` with exclusive access to the monitor.
    pub fn with<R>(&self, f: impl FnOnce(&mut AlertMonitor) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn observe(&self, score: RiskScore) -> Option<WindowVerdict> {
        self.with(|m| m.observe(score))
    }

    pub fn start(&self) -> bool {
        self.with(|m| m.start())
    }

    pub fn stop(&self) -> bool {
        self.with(|m| m.stop())
    }

    pub fn verdict(&self) -> Verdict {
        self.with(|m| m.verdict())
    }

    pub fn state(&self) -> RunState {
        self.with(|m| m.state())
    }
}
