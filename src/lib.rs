//! Stroke monitor: windowed risk scoring of a 4-band telemetry stream.
//!
//! Modular structure:
//! - [`features`] - Band feature vectors and the sample line parser
//! - [`model`] - Standard scaler and ONNX classifier behind the `Scorer` trait
//! - [`risk`] - Window aggregator and the alert state machine
//! - [`transport`] - Non-blocking line sources (device, stdin, memory)
//! - [`storage`] - CSV sample log and SQLite verdict history
//! - [`presentation`] - Status/verdict output and the chart buffer
//! - [`ingest`] - Ingestion tick and the single-threaded scheduler
//! - [`logging`] - Structured logging

pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod risk;
pub mod storage;
pub mod transport;

pub use config::MonitorConfig;
pub use error::{MonitorError, ScoringError};
pub use features::{Band, FeatureVector, SampleParser};
pub use ingest::{Command, IngestionLoop, Scheduler, TickOutcome};
pub use logging::StructuredLogger;
pub use model::{OnnxScorer, RiskScore, Scorer, StandardScaler};
pub use risk::{AlertMonitor, RunState, Verdict, WindowAggregator};
pub use storage::{CsvSampleLog, SampleSink, VerdictHistory};
