//! Stroke monitor entrypoint: `monitor` runs the polling loop against a device or stdin until
//! Ctrl+C or end of input; `predict` scores a single sample.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stroke_monitor::{
    config::{LogConfig, MonitorConfig},
    ingest::{Command, IngestionLoop, Scheduler},
    logging::StructuredLogger,
    model::{classify_probability, OnnxScorer, Scorer, StandardScaler},
    presentation::ConsolePresenter,
    risk::Verdict,
    storage::{CsvSampleLog, VerdictHistory},
    transport::LineReaderTransport,
    FeatureVector,
};
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "stroke-monitor", version, about = "Windowed stroke-risk monitor for band telemetry")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "STROKE_MONITOR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Listen on the transport and emit a verdict per window
    Monitor {
        /// Device path to read lines from ("-" for stdin)
        #[arg(long)]
        device: Option<String>,
        /// Exit after this many window verdicts
        #[arg(long)]
        windows: Option<u64>,
    },
    /// Score one sample and print the single-sample verdict
    #[command(allow_negative_numbers = true)]
    Predict {
        alpha: f64,
        beta: f64,
        theta: f64,
        delta: f64,
    },
}

fn load_scorer(config: &MonitorConfig) -> Result<OnnxScorer, BoxError> {
    let scaler = StandardScaler::load(&config.scoring.scaler_path)?;
    Ok(OnnxScorer::load(&config.scoring.model_path, scaler)?)
}

fn predict(config: &MonitorConfig, values: [f64; 4]) -> Result<(), BoxError> {
    let features = FeatureVector::new(values).ok_or("all four values must be finite")?;
    let scorer = load_scorer(config)?;
    let score = scorer.score(&features)?;
    info!(risk_pct = score.percent(), "single-sample prediction");
    match classify_probability(score) {
        Verdict::AtRisk => println!("Stroke risk detected ({score})"),
        _ => println!("Safe ({score})"),
    }
    Ok(())
}

fn monitor(mut config: MonitorConfig, device: Option<String>, windows: Option<u64>) -> Result<(), BoxError> {
    if let Some(device) = device {
        config.transport.device = device;
    }
    config.validate()?;

    info!(data_dir = ?config.data_dir, device = %config.transport.device, "stroke monitor starting");
    std::fs::create_dir_all(&config.data_dir)?;

    let sink = CsvSampleLog::create(&config.csv_path())?;
    let scorer = load_scorer(&config)?;
    let transport =
        LineReaderTransport::new(config.transport.device.clone()).with_buffer_lines(config.transport.buffer_lines);
    let presenter = ConsolePresenter::stdout(config.presentation.json_events);

    let mut ingest = IngestionLoop::new(&config, transport, scorer, sink, presenter);
    if config.storage.history {
        let history = VerdictHistory::open(&config.history_path())?;
        let days = config.storage.history_retention_days;
        if days > 0 {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(days));
            let pruned = history.prune_before(cutoff.timestamp_millis())?;
            info!(pruned, days, "verdict history retention applied");
        }
        ingest = ingest.with_history(history);
    }

    ingest.start()?;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let ctrl_tx = tx.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = ctrl_tx.send(Command::Shutdown);
    }) {
        warn!(error = %e, "Ctrl+C handler not installed");
    }

    let mut scheduler = Scheduler::new(&config.scheduler);
    if let Some(n) = windows {
        scheduler = scheduler.with_max_windows(n);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let stats = runtime.block_on(scheduler.run(&mut ingest, rx));
    drop(tx);

    info!(
        ticks = stats.ticks,
        accepted = stats.accepted,
        malformed = stats.malformed,
        scoring_failed = stats.scoring_failed,
        storage_failed = stats.storage_failed,
        history_failed = stats.history_failed,
        windows = stats.windows,
        "stroke monitor stopping"
    );
    Ok(())
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = match MonitorConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            // no usable log section; report with the default logger and refuse to run
            StructuredLogger::init(&LogConfig::default());
            error!(path = %cli.config.display(), error = %e, "config rejected");
            return Err(e.into());
        }
    };
    StructuredLogger::init(&config.log);
    if !cli.config.exists() {
        info!(path = %cli.config.display(), "no config file; using defaults");
    }

    match cli.command.unwrap_or(Cmd::Monitor {
        device: None,
        windows: None,
    }) {
        Cmd::Monitor { device, windows } => monitor(config, device, windows),
        Cmd::Predict {
            alpha,
            beta,
            theta,
            delta,
        } => predict(&config, [alpha, beta, theta, delta]),
    }
}
