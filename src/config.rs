//! Monitor configuration. Thresholds are named here instead of living as literals in the loop.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Samples averaged per verdict.
pub const DEFAULT_WINDOW_CAPACITY: usize = 10;
/// Window mean (percent, 0–100) at or above which the verdict is AtRisk.
pub const DEFAULT_ALERT_THRESHOLD_PCT: f64 = 70.0;
/// Probability (0–1) at or above which a single-sample prediction is AtRisk.
pub const CLASSIFICATION_CUT: f64 = 0.5;
/// Ingestion tick period (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Chart refresh period (milliseconds).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 500;
/// Lines the transport reads ahead of the tick before the reader thread blocks.
/// At one line per 500 ms tick this is about half a minute of backlog.
pub const DEFAULT_TRANSPORT_BUFFER_LINES: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Data directory (sample log, verdict history)
    pub data_dir: PathBuf,
    /// Line source
    pub transport: TransportConfig,
    /// Scaler + classifier
    pub scoring: ScoringConfig,
    /// Aggregation window
    pub window: WindowConfig,
    /// Verdict thresholds
    pub alert: AlertConfig,
    /// Tick cadence
    pub scheduler: SchedulerConfig,
    /// Sample log and history
    pub storage: StorageConfig,
    /// Status and chart output
    pub presentation: PresentationConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Device path to read lines from; "-" reads stdin
    pub device: String,
    /// Field delimiter within a line
    pub delimiter: char,
    /// Read-ahead bound in lines; a faster source is held back instead of queued
    pub buffer_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Path to ONNX classifier model
    pub model_path: PathBuf,
    /// Path to JSON standard-scaler parameters
    pub scaler_path: PathBuf,
}

/// What happens to a partially filled window when the monitor stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    #[default]
    DiscardOnStop,
    CarryOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Samples per window
    pub capacity: usize,
    pub policy: WindowPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Window mean (percent) at or above which the verdict is AtRisk
    pub threshold_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub poll_interval_ms: u64,
    pub refresh_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Sample log file name under data_dir
    pub csv_file: String,
    /// Record window verdicts to SQLite
    pub history: bool,
    /// Drop history rows older than this many days at startup (0 keeps everything)
    pub history_retention_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Emit verdicts as JSON lines on stdout
    pub json_events: bool,
    /// Values kept per band for the chart
    pub history_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".stroke-monitor"),
            transport: TransportConfig::default(),
            scoring: ScoringConfig::default(),
            window: WindowConfig::default(),
            alert: AlertConfig::default(),
            scheduler: SchedulerConfig::default(),
            storage: StorageConfig::default(),
            presentation: PresentationConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            device: "-".to_string(),
            delimiter: ',',
            buffer_lines: DEFAULT_TRANSPORT_BUFFER_LINES,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("stroke_model.onnx"),
            scaler_path: PathBuf::from("scaler.json"),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
            policy: WindowPolicy::default(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_pct: DEFAULT_ALERT_THRESHOLD_PCT,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_file: "data.csv".to_string(),
            history: true,
            history_retention_days: 30,
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            json_events: false,
            history_len: 100,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file. A missing file gives the defaults; a file that exists but cannot
    /// be read or parsed is a `Config` error rather than a silent fallback.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&data).map_err(|e| MonitorError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.capacity == 0 {
            return Err(MonitorError::Config("window.capacity must be at least 1".into()));
        }
        let t = self.alert.threshold_pct;
        if !t.is_finite() || !(0.0..=100.0).contains(&t) {
            return Err(MonitorError::Config(format!(
                "alert.threshold_pct must be within [0, 100]; got {t}"
            )));
        }
        if self.scheduler.poll_interval_ms == 0 || self.scheduler.refresh_interval_ms == 0 {
            return Err(MonitorError::Config("scheduler intervals must be non-zero".into()));
        }
        if self.transport.buffer_lines == 0 {
            return Err(MonitorError::Config("transport.buffer_lines must be at least 1".into()));
        }
        Ok(())
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.csv_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}
